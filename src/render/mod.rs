//! EDL text emission.
//!
//! Widgets pick a template by name; the renderer maps names to template
//! functions and wraps the screen header around the result.

mod block;
mod core;

pub use block::EdlBlock;
pub use core::{EdlRenderer, Render, Template, render_node};
pub(crate) use core::render_blocks;
