// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use user_activity_server::config::{AppConfig, LogFormat};
use user_activity_server::{init_tracing, run};

#[tokio::main]
async fn main() -> ExitCode {
    let config = AppConfig::from_env();

    // Log even when configuration is invalid
    init_tracing(config.as_ref().map(|c| c.log_format).unwrap_or(LogFormat::Pretty));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
