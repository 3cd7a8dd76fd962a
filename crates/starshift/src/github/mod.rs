//! GitHub implementation of the [`StarDirectory`](crate::directory::StarDirectory)
//! capability, over the REST and GraphQL APIs via octocrab.
//!
//! Wrap a [`GitHubDirectory`] in
//! [`RetryingDirectory`](crate::retry::RetryingDirectory) to get the
//! standard transient-error retry policy.

mod client;
mod convert;
mod error;

pub use client::GitHubDirectory;
