//! Risk API - Operations for the CLI and embedding callers
//!
//! `RiskApi` wires the store, aggregation engine, trend synthesizer and
//! scoring pipeline together. Every operation is synchronous and returns a
//! typed record or a `RiskError`.

use std::sync::Arc;

use crate::config::Config;
use crate::constants;
use crate::error::{RiskError, RiskResult};
use crate::logic::analytics::{
    AggregationEngine, KpiSummary, LoanAnalytics, RiskAnalytics, SegmentCount, SegmentKey,
};
use crate::logic::decision::{DecisionEngine, PredictionResult};
use crate::logic::features::{ApplicationInput, LayoutInfo};
use crate::logic::model::{ModelService, ModelStatus};
use crate::logic::scoring::ScoringPipeline;
use crate::logic::store::{LoanRecord, SqliteStore, StoreError, TabularStore};
use crate::logic::trend::{PortfolioTrends, TrendSynthesizer};

use super::engine_status::{EngineStatus, HealthReport, TableColumns};

pub struct RiskApi {
    engine: AggregationEngine,
    trends: TrendSynthesizer,
    scoring: ScoringPipeline,
}

impl RiskApi {
    pub fn new(
        store: Arc<dyn TabularStore>,
        models: Arc<ModelService>,
        trends: TrendSynthesizer,
        decision: DecisionEngine,
    ) -> Self {
        Self {
            engine: AggregationEngine::new(store),
            trends,
            scoring: ScoringPipeline::new(models, decision),
        }
    }

    /// SQLite store and model service from `config`; nothing is opened yet
    pub fn from_config(config: &Config) -> RiskResult<Self> {
        let store = SqliteStore::open(config.db_path.clone(), &config.table_name)?;
        log::info!(
            "Risk API configured (db: {}, table: {}, model: {})",
            config.db_path.display(),
            config.table_name,
            config.model_path.display()
        );
        Ok(Self::new(
            Arc::new(store),
            Arc::new(ModelService::from_config(config)),
            TrendSynthesizer::from_config(config),
            DecisionEngine::default(),
        ))
    }

    fn store(&self) -> &Arc<dyn TabularStore> {
        self.engine.store()
    }

    // ========================================================================
    // ANALYTICS
    // ========================================================================

    pub fn get_kpi_summary(&self) -> RiskResult<KpiSummary> {
        self.engine.kpi_summary()
    }

    pub fn get_portfolio_trends(&self) -> RiskResult<PortfolioTrends> {
        self.trends.portfolio_trends(&self.engine)
    }

    pub fn get_loan_analytics(&self) -> RiskResult<LoanAnalytics> {
        self.engine.loan_analytics()
    }

    pub fn get_risk_analytics(&self) -> RiskResult<RiskAnalytics> {
        self.engine.risk_analytics()
    }

    /// Distribution over one of the whitelisted segment keys
    pub fn get_segment_distribution(&self, key: &str) -> RiskResult<Vec<SegmentCount>> {
        let key: SegmentKey = key.parse()?;
        self.engine.distribution(key)
    }

    // ========================================================================
    // RECORDS & CATALOG
    // ========================================================================

    pub fn get_loan(&self, id: i64) -> RiskResult<LoanRecord> {
        self.store()
            .find_loan(id)?
            .ok_or_else(|| StoreError::RecordNotFound(id).into())
    }

    pub fn get_columns(&self) -> RiskResult<TableColumns> {
        let columns = self.store().columns()?;
        Ok(TableColumns {
            table: self.store().table_name().to_string(),
            columns,
        })
    }

    // ========================================================================
    // SCORING
    // ========================================================================

    pub fn predict(&self, input: &ApplicationInput) -> RiskResult<PredictionResult> {
        self.scoring.predict(input)
    }

    // ========================================================================
    // STATUS
    // ========================================================================

    /// Never fails; problems are reported in the body. A missing or empty
    /// table is unhealthy.
    pub fn health_check(&self) -> HealthReport {
        let model_loaded = self.scoring.models().is_loaded();
        let timestamp = chrono::Utc::now().to_rfc3339();

        match self.store().ensure_ready() {
            Ok(total_records) => HealthReport {
                status: "healthy".to_string(),
                version: constants::APP_VERSION.to_string(),
                database_connected: true,
                total_records,
                model_loaded,
                timestamp,
                message: None,
            },
            Err(e) => {
                log::warn!("Health check failed: {}", e);
                HealthReport {
                    status: "unhealthy".to_string(),
                    version: constants::APP_VERSION.to_string(),
                    database_connected: matches!(
                        e,
                        StoreError::MissingTable(_) | StoreError::EmptyTable(_)
                    ),
                    total_records: 0,
                    model_loaded,
                    timestamp,
                    message: Some(e.to_string()),
                }
            }
        }
    }

    pub fn model_status(&self) -> ModelStatus {
        self.scoring.models().status()
    }

    /// Like `model_status`, but loads the model first
    pub fn load_model(&self) -> RiskResult<ModelStatus> {
        self.scoring.models().get().map_err(RiskError::from)?;
        Ok(self.model_status())
    }

    pub fn engine_status(&self) -> EngineStatus {
        EngineStatus {
            layout: LayoutInfo::current(),
            model: self.model_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::fixtures::{logistic_artifact, write_artifact};
    use crate::logic::store::fixtures::{sample_portfolio, store_with};

    fn api_with(records: &[LoanRecord], models: ModelService) -> RiskApi {
        RiskApi::new(
            Arc::new(store_with(records)),
            Arc::new(models),
            TrendSynthesizer::new(0.2, Some(7)),
            DecisionEngine::default(),
        )
    }

    fn no_model() -> ModelService {
        ModelService::new("/nonexistent/credit_model.json", None)
    }

    #[test]
    fn test_analytics_views() {
        let api = api_with(&sample_portfolio(), no_model());

        let kpi = api.get_kpi_summary().unwrap();
        assert_eq!(kpi.overview.total_beneficiaries, 10);

        let trends = api.get_portfolio_trends().unwrap();
        assert_eq!(trends.portfolio_health.len(), 6);
        assert_eq!(trends.current_metrics.total_loans, 10);

        assert!(!api.get_loan_analytics().unwrap().loan_by_grade.is_empty());
        assert_eq!(api.get_risk_analytics().unwrap().credit_risk_analysis.len(), 5);
    }

    #[test]
    fn test_seeded_trends_repeat() {
        let api = api_with(&sample_portfolio(), no_model());
        assert_eq!(api.get_portfolio_trends().unwrap(), api.get_portfolio_trends().unwrap());
    }

    #[test]
    fn test_segment_distribution() {
        let api = api_with(&sample_portfolio(), no_model());

        let grades = api.get_segment_distribution("grade").unwrap();
        assert_eq!(grades.len(), 7);
        assert_eq!(grades[0].segment.as_text(), Some("A"));

        assert!(matches!(
            api.get_segment_distribution("zip_code"),
            Err(RiskError::InvalidSegment(_))
        ));
    }

    #[test]
    fn test_get_loan() {
        let api = api_with(&sample_portfolio(), no_model());

        let loan = api.get_loan(7).unwrap();
        assert_eq!(loan.grade, "D");
        assert_eq!(loan.term, 60);

        assert!(matches!(api.get_loan(999), Err(RiskError::DataUnavailable(_))));
    }

    #[test]
    fn test_get_columns() {
        let api = api_with(&sample_portfolio(), no_model());
        let columns = api.get_columns().unwrap();
        assert_eq!(columns.table, "beneficiaries");
        assert!(columns.columns.iter().any(|c| c.name == "initial_fico_score"));
    }

    #[test]
    fn test_health_check() {
        let api = api_with(&sample_portfolio(), no_model());
        let report = api.health_check();
        assert!(report.is_healthy());
        assert!(report.database_connected);
        assert_eq!(report.total_records, 10);
        assert!(!report.model_loaded);
        assert!(report.message.is_none());
    }

    #[test]
    fn test_health_check_empty_table() {
        let api = api_with(&[], no_model());
        let report = api.health_check();
        assert!(!report.is_healthy());
        assert!(report.database_connected);
        assert_eq!(report.total_records, 0);
        assert!(report.message.unwrap().contains("is empty"));
    }

    #[test]
    fn test_segment_distribution_empty_table() {
        let api = api_with(&[], no_model());
        assert!(matches!(
            api.get_segment_distribution("grade"),
            Err(RiskError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_health_check_missing_database() {
        let config = Config {
            db_path: "/nonexistent/siddhi_db.sqlite".into(),
            ..Config::default()
        };
        let api = RiskApi::from_config(&config).unwrap();

        let report = api.health_check();
        assert!(!report.is_healthy());
        assert!(!report.database_connected);
        assert!(report.message.unwrap().contains("ingestion"));

        assert!(matches!(api.get_kpi_summary(), Err(RiskError::DataUnavailable(_))));
    }

    #[test]
    fn test_predict_without_model() {
        let api = api_with(&sample_portfolio(), no_model());
        let err = api.predict(&ApplicationInput::default()).unwrap_err();
        assert_eq!(err.kind(), "model_unavailable");

        // Analytics keep working
        assert!(api.get_kpi_summary().is_ok());
        assert!(!api.model_status().model_loaded);
    }

    #[test]
    fn test_predict_with_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path(), &logistic_artifact(-3.0));
        let api = api_with(&sample_portfolio(), ModelService::new(&path, None));

        assert!(!api.model_status().model_loaded);
        let result = api.predict(&ApplicationInput::default()).unwrap();
        // sigmoid(-3) = 0.0474
        assert_eq!(result.prediction_probability, 4.74);
        assert_eq!(result.recommendation.as_str(), "APPROVE");

        assert!(api.model_status().model_loaded);
        assert!(api.health_check().model_loaded);
    }

    #[test]
    fn test_load_model_and_engine_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path(), &logistic_artifact(0.0));
        let api = api_with(&sample_portfolio(), ModelService::new(&path, None));

        let status = api.load_model().unwrap();
        assert!(status.model_loaded);

        let engine = api.engine_status();
        assert_eq!(engine.layout.feature_count, 37);
        assert_eq!(engine.layout.hash, crate::logic::features::layout_hash());
        assert_eq!(engine.layout.feature_names[0], "loan_amnt");
        assert!(engine.model.model_loaded);
    }
}
