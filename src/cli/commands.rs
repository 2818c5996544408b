//! CLI command implementations
//!
//! `serve` is the composition point: it loads configuration, opens the one
//! `ItemStore` for the process and hands it to the HTTP server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;
use crate::http_server::HttpServer;
use crate::observability::Logger;
use crate::session::ItemStore;
use crate::storage::table_path;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve {
            config,
            port,
            data_dir,
        } => serve(&config, port, data_dir),
    }
}

/// Create the data directory and an empty item table.
///
/// Fails if the table already exists.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.log_severity()?);

    let store = init_data_dir(config.data_path())?;

    write_response(json!({
        "initialized": true,
        "table": table_path(store.data_dir()).display().to_string(),
    }))
}

/// Creates the item table in `data_dir`, refusing to touch an existing one.
pub fn init_data_dir(data_dir: &Path) -> CliResult<ItemStore> {
    let table = table_path(data_dir);
    if table.exists() {
        return Err(CliError::AlreadyInitialized(table.display().to_string()));
    }

    Ok(ItemStore::open(data_dir)?)
}

/// Open the item table and serve the HTTP API until Ctrl-C.
///
/// The table is created on first startup if absent.
pub fn serve(config_path: &Path, port: Option<u16>, data_dir: Option<PathBuf>) -> CliResult<()> {
    let config = Config::load(config_path)?.with_overrides(data_dir, port)?;
    Logger::set_min_severity(config.log_severity()?);

    let store = ItemStore::open(config.data_path()).map_err(|e| {
        if e.is_fatal() {
            Logger::fatal(
                "STORE_OPEN_FAILED",
                &[("code", e.code().code()), ("message", e.message())],
            );
        }
        CliError::from(e)
    })?;

    let server = HttpServer::with_config(config.http.clone(), Arc::new(store));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Server(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::Server(format!("HTTP server failed: {}", e)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_table_once() {
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("data");

        init_data_dir(&data_dir).unwrap();
        assert!(table_path(&data_dir).exists());

        let err = init_data_dir(&data_dir).unwrap_err();
        assert_eq!(err.code_str(), "ITEM_CLI_ALREADY_INITIALIZED");
    }

    #[test]
    fn test_init_from_config_file() {
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("items");
        let config_path = temp.path().join("itemstore.json");
        std::fs::write(
            &config_path,
            serde_json::to_string(&Config::new(&data_dir)).unwrap(),
        )
        .unwrap();

        init(&config_path).unwrap();
        assert!(table_path(&data_dir).exists());
    }
}
