//! API Module
//!
//! Organized with versioning for backward compatibility.
//!
//! Structure:
//! - commands.rs: `RiskApi`, the current stable surface
//! - engine_status.rs: health / catalog / status records
//! - v1/mod.rs: Re-exports commands as v1 API (for backward compat)

pub mod commands;
pub mod engine_status;
pub mod v1;

// Re-export current version as default
pub use commands::*;
pub use engine_status::{EngineStatus, HealthReport, TableColumns};
