//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! `Config::from_env()` falls back to these values.

use std::path::PathBuf;

/// Default SQLite database file (produced by the ingestion job)
pub const DEFAULT_DB_PATH: &str = "siddhi_db.sqlite";

/// Default loan table name
pub const DEFAULT_TABLE_NAME: &str = "beneficiaries";

/// Default model artifact file name inside the data dir
pub const DEFAULT_MODEL_FILE: &str = "credit_model.onnx";

/// App data directory name under the platform data dir
pub const APP_DIR_NAME: &str = "siddhi";

/// Std-dev of the display noise added to trend points
pub const DEFAULT_TREND_NOISE_STD: f64 = 0.2;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Siddhi Credit Scoring";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Default model path: `<data_local_dir>/siddhi/credit_model.onnx`
pub fn default_model_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(DEFAULT_MODEL_FILE)
}

/// Get database path from environment or use default
pub fn get_db_path() -> PathBuf {
    std::env::var("SIDDHI_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH))
}

/// Get loan table name from environment or use default
pub fn get_table_name() -> String {
    std::env::var("SIDDHI_TABLE").unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string())
}

/// Get model artifact path from environment or use default
pub fn get_model_path() -> PathBuf {
    std::env::var("MODEL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_model_path())
}

/// Expected SHA-256 of the model artifact, if pinned
pub fn get_model_sha256() -> Option<String> {
    std::env::var("MODEL_SHA256")
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Get trend noise std-dev from environment or use default
pub fn get_trend_noise_std() -> f64 {
    std::env::var("TREND_NOISE_STD")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v: &f64| v.is_finite() && *v >= 0.0)
        .unwrap_or(DEFAULT_TREND_NOISE_STD)
}

/// Fixed seed for trend noise (reproducible dashboards)
pub fn get_trend_seed() -> Option<u64> {
    std::env::var("TREND_SEED").ok().and_then(|s| s.parse().ok())
}
