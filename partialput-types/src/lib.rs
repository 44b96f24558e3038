//! Core type definitions for partialput.
//!
//! This crate defines the attribute-level building blocks shared by the
//! model and sync layers:
//! - [`Attributes`], the name → JSON value map every entity stores
//! - attribute diffing and projection helpers used for dirty tracking
//! - [`IntoAttributes`], which folds the bulk-map and single key/value call
//!   forms into one attribute map

mod attributes;

pub use attributes::{
    Attributes, IntoAttributes, diff_attributes, from_value, merge_into, pick, removed_keys,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}
