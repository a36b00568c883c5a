//! Full-graph viewer for a saved capture.

use super::{full_graph_status, load_config, navigate, INPUT_POLL};
use crate::capture::Capture;
use crate::graph::{FrozenSamples, GraphSession};
use crate::ui::{GraphCommand, InputHandler, StatusLine, TerminalSurface};
use std::path::Path;

/// Shows the capture in `file` with panning and zoom until the user quits.
///
/// # Errors
/// - If the configuration or capture file cannot be loaded
/// - If the terminal cannot be initialized
pub fn handle_view(file: &Path) -> anyhow::Result<()> {
    let capture = Capture::load(file)?;
    if capture.samples.is_empty() {
        println!("Capture has no samples: {}", file.display());
        return Ok(());
    }

    let config = load_config()?;
    let sample_count = capture.samples.len();
    let duration_ms = capture.duration_ms();
    tracing::info!(
        "Viewing {} ({} samples, {}ms)",
        file.display(),
        sample_count,
        duration_ms
    );

    let status = StatusLine::default();
    let surface = TerminalSurface::new(status.clone())
        .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    let mut session = GraphSession::new(config.graph_settings());
    status.set(full_graph_status(&session, sample_count, duration_ms));
    session.attach_to_surface(Box::new(surface));
    session.show_full_graph(FrozenSamples::from(capture));

    let mut input = InputHandler::new();
    loop {
        let command = input.poll(INPUT_POLL)?;
        if command == GraphCommand::Quit {
            break;
        }
        if navigate(&mut session, command) {
            status.set(full_graph_status(&session, sample_count, duration_ms));
        }
    }

    Ok(())
}
