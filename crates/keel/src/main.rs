mod cli;
mod logging;
mod manifest;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use keel_core::Result;

use crate::cli::{CliArgs, Command};
use crate::manifest::Manifest;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = logging::init(args.verbose) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let outcome = match &args.command {
        Command::Run { manifest } => run(manifest).await,
        Command::Order { manifest } => order(manifest).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Start the system, print its running snapshot, then stop it
async fn run(path: &Path) -> Result<()> {
    let system = Manifest::load(path).await?.build()?;
    info!("Loaded system {} from {}", system.name(), path.display());

    let running = match system.start().await {
        Ok(running) => running,
        Err(e) => {
            // Roll back whatever started before the failure
            if let Err(stop_error) = system.stop().await {
                error!("Failed to stop partially started system: {}", stop_error);
            }
            return Err(e);
        }
    };

    let rendered = serde_json::to_string_pretty(&running.to_json())
        .map_err(|e| keel_core::Error::Other(format!("Failed to render snapshot: {}", e)))?;
    println!("{}", rendered);

    system.stop().await
}

async fn order(path: &Path) -> Result<()> {
    let system = Manifest::load(path).await?.build()?;
    println!("start: {}", system.start_order()?.join(", "));
    println!("stop: {}", system.stop_order()?.join(", "));
    Ok(())
}
