// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ezr2mqtt` command line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ezr2mqtt::Bridge;
use ezr2mqtt::config::{Config, DEFAULT_CONFIG_FILE};

/// Bridge between EZR heating controllers and an MQTT broker.
#[derive(Debug, Parser)]
#[command(name = "ezr2mqtt", version, about)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes
    /// precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the bridge until interrupted.
    Start {
        /// Configuration file. Defaults apply when it does not exist.
        #[arg(short = 'c', long = "config-file", default_value = DEFAULT_CONFIG_FILE)]
        config_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "ezr2mqtt failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();
}

async fn run(command: Command) -> ezr2mqtt::Result<()> {
    match command {
        Command::Start { config_file } => {
            let config = Config::load(&config_file)?;
            let mut bridge = Bridge::from_config(&config)?;
            bridge.start().await?;

            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
            bridge.shutdown().await
        }
    }
}
