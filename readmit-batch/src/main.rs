//! Bulk Scoring Utility
//!
//! Scores a CSV file of already encoded feature records from the command
//! line, one assessment per row. Uses the same engine construction as
//! the web service, so a document accepted here is accepted there.
//!
//! **Usage:**
//! ```bash
//! readmit-batch records.csv [--model model/safe_model.json] [--json]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::info;

use readmit_common::assess::AssessmentEngine;
use readmit_common::batch::decode_csv;
use readmit_common::config::ServiceConfig;
use readmit_common::encoding::EncodingTables;
use readmit_common::model::GbtModel;
use readmit_common::risk::RiskTier;

/// Bulk scoring utility
#[derive(Parser, Debug)]
#[command(name = "readmit-batch")]
#[command(about = "Score a CSV of feature records against the readmission model")]
#[command(version)]
struct Args {
    /// CSV file with a model-schema header row
    input: PathBuf,

    /// Path to the boosted-tree model artifact
    #[arg(short, long, env = "READMIT_MODEL")]
    model: Option<PathBuf>,

    /// Path to a TOML encoding-tables override
    #[arg(short, long, env = "READMIT_TABLES")]
    tables: Option<PathBuf>,

    /// Emit JSON lines instead of CSV
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let config = ServiceConfig::resolve(args.model, args.tables, None, None)
        .context("Failed to resolve configuration")?;

    let tables = match &config.tables_path {
        Some(path) => EncodingTables::from_toml_path(path)
            .context("Failed to load encoding tables")?,
        None => EncodingTables::default(),
    };

    let model = GbtModel::load(&config.model_path).context("Failed to load model artifact")?;
    let engine = AssessmentEngine::new(Box::new(model), tables, config.risk_policy)
        .context("Failed to initialize assessment engine")?;

    let document = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let records = decode_csv(&document).context("Rejected input document")?;
    info!("Scoring {} records from {}", records.len(), args.input.display());

    let assessments = engine.assess_batch(&records)?;

    if args.json {
        for (index, assessment) in assessments.iter().enumerate() {
            let line = json!({
                "row": index + 1,
                "probability": assessment.probability,
                "risk_index": assessment.risk_index,
                "risk_tier": assessment.risk_tier,
                "recommendation": assessment.recommendation,
            });
            println!("{line}");
        }
    } else {
        println!("row,probability,risk_index,risk_tier");
        for (index, assessment) in assessments.iter().enumerate() {
            println!(
                "{},{:.6},{},{}",
                index + 1,
                assessment.probability,
                assessment.risk_index,
                assessment.risk_tier
            );
        }
    }

    let high = assessments
        .iter()
        .filter(|a| a.risk_tier == RiskTier::High)
        .count();
    info!(
        "Scored {} records ({} high risk)",
        assessments.len(),
        high
    );

    Ok(())
}
