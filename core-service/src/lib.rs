//! Siddhi Risk Core
//!
//! Credit-risk scoring and portfolio analytics over a loan table.
//!
//! - `logic`: store access, aggregation, trends, encoding, classifiers, decisions
//! - `api`: `RiskApi`, the operations the binary exposes
//! - `config` / `constants`: environment-driven configuration

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod logic;

pub use api::RiskApi;
pub use config::Config;
pub use error::{RiskError, RiskResult};
