//! Layout policies and the layout node.
//!
//! Arrangement is a pure function of the anchor, spacing and child sizes;
//! the tree applies it and keeps ancestors in sync.

mod core;
mod policy;

pub use core::{DEFAULT_SPACING, Layout};
pub use policy::{Arrangement, Policy, StackAlignment};
