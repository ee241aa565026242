use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Keel: start and stop dependency-ordered components
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Log at debug level, including the per-component trace
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start every component of a manifest, print the running system, stop it
    Run {
        /// Manifest file (.json, .yaml, .yml or .toml)
        manifest: PathBuf,
    },
    /// Print the order components would start and stop in
    Order {
        /// Manifest file (.json, .yaml, .yml or .toml)
        manifest: PathBuf,
    },
}
