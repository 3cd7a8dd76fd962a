//! Capability trait for services that hold a user's starred repositories.
//!
//! This module defines the [`StarDirectory`] trait, the seam the
//! migration pipeline depends on. The pipeline only ever counts,
//! pages, stars and unstars through this interface; the GitHub
//! implementation lives in [`crate::github`] behind the `github`
//! feature, and tests substitute in-memory fakes.

mod errors;
mod types;

pub use errors::{DirectoryError, Result, short_error_message};
pub use types::{Identity, StarDirectory, StarredRepo};
