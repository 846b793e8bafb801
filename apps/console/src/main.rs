//! Stratum role administration console.

#![forbid(unsafe_code)]

mod cli;
mod commands;
mod console_config;
mod output;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use stratum_application::RoleEditorService;
use stratum_core::{AppError, AppResult};
use stratum_infrastructure::{HttpRoleAdminRepository, InMemoryQueryCache};
use tracing::error;

use crate::cli::Cli;
use crate::console_config::{ConsoleConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let service = match build_service() {
        Ok(service) => service,
        Err(error) => {
            error!(error = %error, "failed to start console");
            return ExitCode::FAILURE;
        }
    };

    match commands::run(&service, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(error = %error, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn build_service() -> AppResult<RoleEditorService> {
    let config = ConsoleConfig::load()?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_seconds))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let repository = HttpRoleAdminRepository::new(
        http_client,
        config.api_base_url,
        config.api_token,
        config.http_max_attempts,
        config.http_retry_backoff_ms,
    );

    Ok(RoleEditorService::new(Arc::new(repository))
        .with_query_cache(Arc::new(InMemoryQueryCache::new()), config.cache_ttl_seconds))
}
