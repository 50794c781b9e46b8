#![warn(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use webguard::scheduler::run_every_five_minutes;
use webguard::{Config, Runner};

mod cli;
mod error;
mod routes;

use cli::{Cli, Command};
use error::AppError;
use logger::init_tracing;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing().context("failed to initialise logging")?;

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    info!("{config}");

    match cli.selected_command() {
        Command::Serve => serve(config).await?,
        Command::Monitoring => run_monitoring(&config).await?,
    }

    Ok(())
}

/// Run every monitoring job once
async fn run_monitoring(config: &Config) -> Result<(), AppError> {
    let runner = Runner::from_config(config)?;
    let report = runner.run_once(&CancellationToken::new()).await;
    if !report.is_complete() {
        warn!("Monitoring run completed with failed phases");
    }

    Ok(())
}

/// Start the five-minute scheduler and the liveness endpoint.
///
/// Returns once the HTTP server has shut down; the scheduler is stopped with it.
async fn serve(config: Config) -> Result<(), AppError> {
    let addr = config.listen_address();
    let runner = Arc::new(Runner::from_config(&config)?);
    let cancel = CancellationToken::new();

    let scheduler = {
        let cancel = cancel.clone();
        actix_web::rt::spawn(run_every_five_minutes(cancel.clone(), move || {
            let runner = runner.clone();
            let cancel = cancel.clone();
            async move {
                let report = runner.run_once(&cancel).await;
                if !report.is_complete() {
                    warn!("Monitoring run completed with failed phases");
                }
            }
        }))
    };

    info!(%addr, "Starting liveness endpoint");
    let served = run_server(addr).await;

    cancel.cancel();
    if let Err(e) = scheduler.await {
        warn!("Scheduler task ended abnormally: {e}");
    }

    served
}

async fn run_server(addr: String) -> Result<(), AppError> {
    HttpServer::new(|| App::new().configure(routes::routes))
        .bind(addr)?
        .run()
        .await?;

    Ok(())
}
