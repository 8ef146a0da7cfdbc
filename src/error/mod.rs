//! Error module orchestrator.
//!
//! Every fallible operation in the crate returns [`Result`]; the concrete
//! variants live in the private `types` module.

mod types;

pub use types::{EdlError, LaunchError, Result, StructuralError};
