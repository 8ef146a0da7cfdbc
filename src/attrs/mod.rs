//! Attribute schema module orchestrator.
//!
//! Widget kinds declare their attributes here as plain data: a name, a
//! declared type, a default and an optional validation hook. Values are
//! coerced into the declared type on every write.

mod core;

pub use core::{AttrHook, AttrSpec, AttrType, AttrValue, Attributes, Schema};
