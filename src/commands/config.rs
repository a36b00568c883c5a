//! Configuration file editor command.
//!
//! Opens the wavegraph configuration file in the user's preferred editor.

use crate::config::{get_config_path, WavegraphConfig};
use std::process::Command;

/// Opens the configuration file in the user's preferred editor.
///
/// The file is created with default values first if it does not exist. After
/// editing, the file is parsed once so mistakes are reported right away.
///
/// # Errors
/// - If no editor can be found or executed
/// - If the edited file is not valid configuration
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    WavegraphConfig::load_or_init(&config_path)?;

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor()?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    WavegraphConfig::load_from(&config_path)?;
    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Tries in order: $EDITOR, nano, vi.
fn find_editor() -> anyhow::Result<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }

    for editor in &["nano", "vi"] {
        if is_editor_available(editor) {
            return Ok(editor.to_string());
        }
    }

    Err(anyhow::anyhow!(
        "No editor found. Please set the $EDITOR environment variable."
    ))
}

fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
