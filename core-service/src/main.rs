//! Siddhi Risk - Command Line Entry Point
//!
//! Each subcommand runs one engine operation and prints its JSON result.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use siddhi_risk_core::constants;
use siddhi_risk_core::logic::features::ApplicationInput;
use siddhi_risk_core::{Config, RiskApi};

#[derive(Parser)]
#[command(name = "siddhi-risk")]
#[command(version, about = "Siddhi credit risk scoring and portfolio analytics", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// SQLite database (overrides SIDDHI_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Model file, `.onnx` or JSON (overrides MODEL_PATH)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Seed for trend noise (overrides TREND_SEED)
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Portfolio KPI summary
    Kpi,

    /// Six-month portfolio health trend
    Trends,

    /// Loan analytics by grade, purpose and term
    Loans,

    /// Default analytics by grade, credit band and home ownership
    Risk,

    /// Distribution over one segment key
    Segment {
        /// grade, purpose, home_ownership, verification_status or term
        key: String,
    },

    /// Single loan record
    Loan {
        id: i64,
    },

    /// Loan table column catalog
    Columns,

    /// Database and model health
    Health,

    /// Model load state
    ModelStatus {
        /// Load the model before reporting
        #[arg(long)]
        load: bool,
    },

    /// Feature layout and model state
    EngineStatus,

    /// Score a loan application
    Predict {
        /// Application JSON file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_application(path: &PathBuf) -> anyhow::Result<ApplicationInput> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read application file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Malformed application in {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(model) = cli.model {
        config.model_path = model;
    }
    if cli.seed.is_some() {
        config.trend_seed = cli.seed;
    }

    let api = RiskApi::from_config(&config)?;

    match cli.command {
        Commands::Kpi => print_json(&api.get_kpi_summary()?)?,
        Commands::Trends => print_json(&api.get_portfolio_trends()?)?,
        Commands::Loans => print_json(&api.get_loan_analytics()?)?,
        Commands::Risk => print_json(&api.get_risk_analytics()?)?,
        Commands::Segment { key } => print_json(&api.get_segment_distribution(&key)?)?,
        Commands::Loan { id } => print_json(&api.get_loan(id)?)?,
        Commands::Columns => print_json(&api.get_columns()?)?,
        Commands::Health => {
            let report = api.health_check();
            print_json(&report)?;
            if !report.is_healthy() {
                std::process::exit(1);
            }
        }
        Commands::ModelStatus { load } => {
            if load {
                print_json(&api.load_model()?)?
            } else {
                print_json(&api.model_status())?
            }
        }
        Commands::EngineStatus => print_json(&api.engine_status())?,
        Commands::Predict { input } => {
            let application = read_application(&input)?;
            print_json(&api.predict(&application)?)?
        }
    }

    Ok(())
}
