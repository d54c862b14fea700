//! Configuration module

use std::path::PathBuf;

use crate::constants;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database holding the loan table
    pub db_path: PathBuf,

    /// Loan table name
    pub table_name: String,

    /// Model artifact (JSON)
    pub model_path: PathBuf,

    /// Pinned SHA-256 of the model artifact
    pub model_sha256: Option<String>,

    /// Std-dev of trend display noise
    pub trend_noise_std: f64,

    /// Seed for trend noise; entropy when unset
    pub trend_seed: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            db_path: constants::get_db_path(),
            table_name: constants::get_table_name(),
            model_path: constants::get_model_path(),
            model_sha256: constants::get_model_sha256(),
            trend_noise_std: constants::get_trend_noise_std(),
            trend_seed: constants::get_trend_seed(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(constants::DEFAULT_DB_PATH),
            table_name: constants::DEFAULT_TABLE_NAME.to_string(),
            model_path: constants::default_model_path(),
            model_sha256: None,
            trend_noise_std: constants::DEFAULT_TREND_NOISE_STD,
            trend_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.table_name, "beneficiaries");
        assert_eq!(config.db_path, PathBuf::from("siddhi_db.sqlite"));
        assert!(config.model_path.ends_with("credit_model.onnx"));
        assert_eq!(config.trend_noise_std, 0.2);
        assert!(config.trend_seed.is_none());
    }
}
