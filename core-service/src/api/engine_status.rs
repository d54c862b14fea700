use serde::{Deserialize, Serialize};

use crate::logic::features::LayoutInfo;
use crate::logic::store::ColumnInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String, // "healthy" | "unhealthy"
    pub version: String,
    pub database_connected: bool,
    pub total_records: u64,
    pub model_loaded: bool,
    pub timestamp: String,
    pub message: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableColumns {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
}

/// Feature layout the engine was built with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub layout: LayoutInfo,
    pub model: crate::logic::model::ModelStatus,
}
