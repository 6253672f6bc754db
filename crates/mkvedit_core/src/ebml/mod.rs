//! In-memory Matroska element trees.
//!
//! Chapters, tags, tracks and segment info are all represented as
//! generic [`Element`] trees keyed by element id. The [`schema`] table
//! supplies names, kinds and default values.

mod element;
pub mod ids;
pub mod schema;

pub use element::{Content, Element, Value};
pub use ids::ElementId;
pub use schema::{ElementKind, ElementSpec};
