mod cli;

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::{Arc, Mutex},
};

use clap::Parser;
use common::{storage::notion::NotionStore, utils::config::get_config};
use ingestion_pipeline::{BatchPipeline, DataSources, DefaultPipelineServices, IngestionConfig};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::{BatchInput, Cli};

fn init_tracing(log_file: &Path) {
    let file_layer = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(err) => {
            eprintln!("could not open log file {}: {err}", log_file.display());
            None
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .ok();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // A local .env supplies credentials the environment does not already set.
    dotenvy::dotenv().ok();

    // The log file location itself comes from config, so load it first.
    let config = get_config();
    let log_file = config
        .as_ref()
        .map_or_else(|_| PathBuf::from("myapp.log"), |c| c.log_file.clone());
    init_tracing(&log_file);

    let config = match config {
        Ok(config) => config,
        Err(err) => {
            error!(fatal = true, error = %err, "invalid configuration");
            return Ok(ExitCode::FAILURE);
        }
    };

    let input = match cli.batch_input(&config.video_ids_file) {
        Ok(input) => input,
        Err(err) => {
            error!(fatal = true, error = format!("{err:#}"), "invalid batch input");
            return Ok(ExitCode::FAILURE);
        }
    };

    let store = match NotionStore::from_config(&config) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            error!(fatal = true, error = %err, "could not build record store client");
            return Ok(ExitCode::FAILURE);
        }
    };
    let services = match DefaultPipelineServices::from_config(&config) {
        Ok(services) => Arc::new(services),
        Err(err) => {
            error!(fatal = true, error = %err, "could not build pipeline services");
            return Ok(ExitCode::FAILURE);
        }
    };

    let pipeline = BatchPipeline::new(
        store,
        services,
        &DataSources::from_config(&config),
        &IngestionConfig::from_config(&config),
    );

    let report = match input {
        BatchInput::Videos(ids) => pipeline.run(&ids).await,
        BatchInput::Backups(paths) => pipeline.run_from_backups(&paths).await,
    };

    info!(
        imported = report.imported(),
        skipped = report.skipped(),
        failed = report.failed(),
        "all videos processed"
    );

    Ok(ExitCode::SUCCESS)
}
