//! Serve command - run the HTTP extraction service.

use std::sync::Arc;

use clap::Args;
use tokio::net::TcpListener;
use tracing::{info, warn};

use formscan_core::{FormScanner, OcrBackend, PredictionClient, TesseractEngine};

use crate::api::{self, AppState};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind to (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Prediction service URL (overrides config)
    #[arg(long)]
    prediction_url: Option<String>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;

    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.prediction_url {
        config.prediction.endpoint = url;
    }

    let ocr = TesseractEngine::new(config.ocr.clone());
    if !ocr.is_available() {
        warn!(
            binary = %config.ocr.binary,
            "OCR engine not available; /extract will fail until it is installed"
        );
    }

    let predictor = PredictionClient::new(&config.prediction)?;
    let state = Arc::new(AppState {
        scanner: FormScanner::new(Arc::new(ocr)),
        predictor,
    });

    let app = api::build_router(state, config.server.max_upload_bytes);
    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    info!(
        addr = %addr,
        prediction = %config.prediction.endpoint,
        "HTTP API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
