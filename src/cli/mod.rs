//! CLI module for itemstore
//!
//! Provides command-line interface for:
//! - init: Create the data directory and item table
//! - serve: Open the table and serve the HTTP API

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, init_data_dir, run, run_command, serve};
pub use config::Config;
pub use errors::{CliError, CliResult};
