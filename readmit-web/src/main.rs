//! Readmission Risk Assessment Service (readmit-web) - Main entry point
//!
//! Serves the single-page clinical form and the assessment API. The
//! model artifact and encoding tables are loaded once here and shared
//! read-only with every request handler.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use readmit_common::assess::AssessmentEngine;
use readmit_common::config::ServiceConfig;
use readmit_common::encoding::EncodingTables;
use readmit_common::model::GbtModel;
use readmit_web::{build_router, AppState};

/// Command-line arguments for readmit-web
#[derive(Parser, Debug)]
#[command(name = "readmit-web")]
#[command(about = "Readmission risk assessment service")]
#[command(version)]
struct Args {
    /// Path to the boosted-tree model artifact
    #[arg(short, long, env = "READMIT_MODEL")]
    model: Option<PathBuf>,

    /// Path to a TOML encoding-tables override
    #[arg(short, long, env = "READMIT_TABLES")]
    tables: Option<PathBuf>,

    /// Host to bind
    #[arg(long, env = "READMIT_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "READMIT_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "readmit_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Readmission Risk Assessment Service (readmit-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Parse command-line arguments
    let args = Args::parse();

    let config = ServiceConfig::resolve(args.model, args.tables, args.host, args.port)
        .context("Failed to resolve configuration")?;

    let tables = match &config.tables_path {
        Some(path) => {
            info!("Encoding tables: {}", path.display());
            EncodingTables::from_toml_path(path).context("Failed to load encoding tables")?
        }
        None => EncodingTables::default(),
    };
    info!("Encoding tables version: {}", tables.version);

    info!("Model artifact: {}", config.model_path.display());
    let model =
        GbtModel::load(&config.model_path).context("Failed to load model artifact")?;

    let engine = Arc::new(
        AssessmentEngine::new(Box::new(model), tables, config.risk_policy)
            .context("Failed to initialize assessment engine")?,
    );
    info!("Assessment engine initialized");

    // Create application state and router
    let state = AppState::new(engine);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("readmit-web listening on http://{addr}");
    info!("Health check: http://{addr}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
