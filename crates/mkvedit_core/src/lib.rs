//! mkvedit core - Matroska chapter and tag editing logic
//!
//! This crate holds the element-tree model, chapter parsers and tree
//! algorithms, tag edits and track statistics accounting. Reading and
//! writing the binary container is left to the caller.

pub mod chapters;
pub mod config;
pub mod ebml;
pub mod logging;
pub mod tags;
pub mod uid;
pub mod webm;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
