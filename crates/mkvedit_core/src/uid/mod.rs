//! Unique-ID registry for chapter and edition UIDs.
//!
//! UIDs are random non-zero 64-bit values. A registry tracks the values
//! it handed out (or was told about) per namespace so it never returns a
//! duplicate. Tracking can be switched off per namespace for workloads
//! that don't need collision checks.

mod registry;

pub use registry::{SharedUidRegistry, UidAllocator, UidNamespace, UidRegistry};
