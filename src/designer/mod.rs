//! Screen-level editing, rendering and saving.

mod core;

pub use core::{Designer, LayoutPlacement, SaveOutcome};
