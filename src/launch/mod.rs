//! Launching the EDM viewer.

mod core;

pub use core::{LaunchOptions, LaunchOutcome, Launcher, join_macros};
