//! Declarative layout of EDM displays.
//!
//! Widgets are inserted into a [`WidgetTree`] and grouped by horizontal,
//! vertical and stacked layouts that position them automatically. A
//! [`Designer`] places the outermost layout on a screen, renders the result
//! as EDL text and can hand it to the EDM viewer.

pub mod attrs;
pub mod choices;
pub mod config;
pub mod designer;
pub mod error;
pub mod font;
pub mod geometry;
pub mod launch;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod probe;
pub mod pv;
pub mod render;
pub mod screen;
pub mod tree;
pub mod visibility;
pub mod widget;
pub mod width;

pub use attrs::{AttrType, AttrValue, Attributes, Schema};
pub use choices::{AlignmentChoice, ColorChoice, FontChoice};
pub use config::{DesignerConfig, LauncherConfig, ScreenSettings};
pub use designer::{Designer, LayoutPlacement, SaveOutcome};
pub use error::{EdlError, LaunchError, Result, StructuralError};
pub use font::Font;
pub use geometry::Rect;
pub use launch::{LaunchOptions, LaunchOutcome, Launcher};
pub use layout::{Layout, Policy, StackAlignment};
pub use logging::{FileSink, LogEvent, LogFields, LogLevel, Logger, LoggingError, MemorySink};
pub use metrics::{LayoutMetrics, MetricSnapshot};
pub use probe::find_screen_size;
pub use pv::{LocalPv, LocalValue};
pub use render::{EdlRenderer, Render, render_node};
pub use screen::Screen;
pub use tree::{Node, NodeId, WidgetTree};
pub use visibility::Visibility;
pub use widget::{Display, Widget, WidgetKind};
pub use width::display_width;
