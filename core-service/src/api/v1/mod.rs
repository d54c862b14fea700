//! API v1 Module
//!
//! Re-exports the current stable API for versioning.

pub use super::commands::*;
