// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolgate: HTTP print gateway.
//
// Entry point. Initialises logging, reads configuration from the environment,
// wires the print pipeline to the OS spooler, and serves until Ctrl-C.

use std::process::ExitCode;

use tracing::{error, info, warn};

use spoolgate_core::config::ServerConfig;
use spoolgate_core::error::{Result, SpoolgateError};
use spoolgate_print::{DocumentStore, PrintService};
use spoolgate_server::HttpServer;
use spoolgate_server::routes::ROUTES;
use spoolgate_spooler::platform_spooler;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Spoolgate failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = ServerConfig::from_env()?;
    info!(
        upload_dir = %config.upload_dir.display(),
        max_body_bytes = config.max_body_bytes,
        "Spoolgate starting"
    );
    if config.printer.printer_id.is_none() {
        warn!("PRINTER_ID is not set; print requests must name a printer");
    }
    if config.printer.paper_size.is_none() {
        warn!("PRINTER_PAPER_SIZE is not set; print requests must name a paper size");
    }

    let store = DocumentStore::open(config.upload_dir.clone()).await?;
    info!(dir = %store.dir().display(), "document store ready");
    let spooler = platform_spooler(&config);
    info!(backend = spooler.backend_name(), "print spooler ready");

    let service = PrintService::new(&config, spooler, store);
    let mut server = HttpServer::new(&config, service);
    let addr = server.start().await?;

    info!(%addr, "Spoolgate listening");
    for route in ROUTES {
        info!("  {route}");
    }

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| SpoolgateError::Server(format!("wait for Ctrl-C: {e}")))?;
    info!("shutdown requested");
    server.stop().await
}
