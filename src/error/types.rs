use std::path::PathBuf;

use thiserror::Error;

/// Unified result type for the crate.
pub type Result<T> = std::result::Result<T, EdlError>;

/// Errors surfaced while building, arranging or emitting a display.
#[derive(Debug, Error)]
pub enum EdlError {
    #[error("invalid value for `{field}`: {reason}")]
    Validation { field: String, reason: String },
    #[error("{kind} has no attribute `{attribute}`")]
    UnknownAttribute { kind: String, attribute: String },
    #[error("layout `{0}` has no widgets")]
    EmptyLayout(String),
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error("policy violation: {0}")]
    PolicyViolation(String),
    #[error("widget `{widget}` has no such template `{template}`")]
    MissingTemplate { widget: String, template: String },
    #[error("no screen size declared in EDL text")]
    ScreenSizeNotFound,
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EdlError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn policy(reason: impl Into<String>) -> Self {
        Self::PolicyViolation(reason.into())
    }
}

/// Wrong node kind or an ownership rule broken while editing the tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructuralError {
    #[error("node {0} does not exist")]
    UnknownNode(String),
    #[error("node {0} is a layout, expected a widget")]
    ExpectedWidget(String),
    #[error("node {0} is a widget, expected a layout")]
    ExpectedLayout(String),
    #[error("node {0} already belongs to a layout")]
    AlreadyAttached(String),
    #[error("adding {child} to {parent} would create a cycle")]
    Cycle { parent: String, child: String },
    #[error("child index {index} out of bounds for layout with {len} children")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Failures of the external viewer launcher.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("display file {0} does not exist")]
    FileNotFound(PathBuf),
    #[error("`{0}` is not in the current environment")]
    ExecutableMissing(String),
    #[error("viewer did not exit within {0:?} and was killed")]
    TimedOut(std::time::Duration),
    #[error("failed to spawn viewer: {0}")]
    Spawn(#[source] std::io::Error),
}
