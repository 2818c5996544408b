//! CLI argument definitions using clap
//!
//! Commands:
//! - itemstore init --config <path>
//! - itemstore serve --config <path> [--port <port>] [--data-dir <dir>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// itemstore - a durable item record store served over HTTP
#[derive(Parser, Debug)]
#[command(name = "itemstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and an empty item table
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./itemstore.json")]
        config: PathBuf,
    },

    /// Open the item table and serve the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./itemstore.json")]
        config: PathBuf,

        /// Port to listen on, overriding the config file
        #[arg(long)]
        port: Option<u16>,

        /// Data directory, overriding the config file
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
