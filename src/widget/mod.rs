//! Widget module orchestrator.
//!
//! A widget is a rectangle plus a kind and a validated attribute bag. Kinds
//! and their schemas live in `kind`, the node itself in `core`, and the
//! embedded-display helpers in `embedded`.

mod core;
mod embedded;
mod kind;

pub use core::Widget;
pub use embedded::Display;
pub use kind::{EdmVersion, WidgetKind};
