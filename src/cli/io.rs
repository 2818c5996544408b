//! JSON output for CLI commands
//!
//! Command results are written to stdout as a single JSON object.

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response).map_err(io::Error::from)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
