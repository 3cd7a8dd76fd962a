//! Command handlers for the starshift CLI.

pub mod check;
pub mod migrate;
pub mod shared;
