//! Organizing the source tree into the BIDS layout.
//!
//! Every image is classified from its JSON sidecar and file name, then
//! copied to the location determined by the [`PathGenerator`](crate::PathGenerator)
//! template together with its sidecars. Destination files are overwritten
//! unless they already hold identical content.
//!
//! The primary entry point is [`organize`] which walks every subject folder of
//! the source backend in sorted order and streams the resulting [`Action`]s
//! from passing each discovered image to [`organize_image`].

pub mod error;
mod file;
mod stream;

pub use self::file::{Action, Placement, SkipReason, organize_image};
pub use self::stream::{OrganizeEvent, organize};
