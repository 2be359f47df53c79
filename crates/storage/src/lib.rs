pub mod backend;
pub mod error;
pub mod file;
mod path;
mod transfer;

pub use crate::backend::StorageBackend;
pub use crate::file::FileInfo;
pub use crate::path::validate as validate_path;
pub use crate::transfer::{copy, digest, same_content};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
