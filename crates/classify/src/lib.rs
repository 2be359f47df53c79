//! Rule-based classification of NIfTI images into BIDS categories.
//!
//! The entrypoint is [`classify`], which maps a sidecar [`MetadataRecord`] and
//! the image's file name onto a [`Classification`]. Rules live in the ordered
//! [`RULES`] table and are evaluated first-match-wins.

pub mod error;
pub mod models;
mod rules;

pub use crate::models::{Category, Classification, MetadataRecord};
pub use crate::rules::{RULES, Rule, classify};
