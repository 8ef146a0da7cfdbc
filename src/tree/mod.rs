//! Arena of widgets and layouts and the operations that keep it arranged.

mod core;

pub use core::{Node, WidgetTree};
pub use indextree::NodeId;
