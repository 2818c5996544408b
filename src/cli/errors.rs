//! CLI-specific error types
//!
//! All CLI errors end the process with a non-zero exit code.

use std::io;

use thiserror::Error;

use crate::storage::StorageError;

/// CLI error, one variant per exit reason
#[derive(Debug, Error)]
pub enum CliError {
    #[error("ITEM_CLI_CONFIG_ERROR: {0}")]
    Config(String),

    #[error("ITEM_CLI_ALREADY_INITIALIZED: Item table already exists: {0}")]
    AlreadyInitialized(String),

    /// The store could not be opened
    #[error("ITEM_CLI_BOOT_FAILED: {0}")]
    Store(#[from] StorageError),

    /// The runtime or the listener failed
    #[error("ITEM_CLI_BOOT_FAILED: {0}")]
    Server(String),

    /// Writing the command result to stdout failed
    #[error("ITEM_CLI_OUTPUT_FAILED: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    /// Stable error code string
    pub fn code_str(&self) -> &'static str {
        match self {
            Self::Config(_) => "ITEM_CLI_CONFIG_ERROR",
            Self::AlreadyInitialized(_) => "ITEM_CLI_ALREADY_INITIALIZED",
            Self::Store(_) | Self::Server(_) => "ITEM_CLI_BOOT_FAILED",
            Self::Output(_) => "ITEM_CLI_OUTPUT_FAILED",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
