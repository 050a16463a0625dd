pub(crate) mod report;
pub(crate) mod story;

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

/// Write pretty JSON to `output`, or stdout when absent.
pub(crate) fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    emit_text(&json, output)
}

pub(crate) fn emit_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::info!(path = %path.display(), "Wrote output");
        },
        None => println!("{text}"),
    }
    Ok(())
}
