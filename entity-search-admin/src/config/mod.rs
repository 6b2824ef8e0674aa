//! Configuration and dependency initialization for the admin binary.
mod dependencies;

pub use dependencies::{ConnectionMode, Dependencies};
