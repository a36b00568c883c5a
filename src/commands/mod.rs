//! Application command handlers for wavegraph.
//!
//! # Commands
//! - `live`: Live capture with a scrolling graph, then the full graph
//! - `view`: Full graph of a saved capture
//! - `config`: Open configuration file in user's preferred editor
//! - `logs`: Display recent log entries

pub mod config;
pub mod live;
pub mod logs;
pub mod view;

pub use config::handle_config;
pub use live::handle_live;
pub use logs::handle_logs;
pub use view::handle_view;

use crate::config::WavegraphConfig;
use crate::graph::GraphSession;
use crate::ui::{self, GraphCommand};
use std::time::Duration;

/// How long the input loop waits for an event before refreshing the footer.
pub(crate) const INPUT_POLL: Duration = Duration::from_millis(50);

/// Loads the configuration, showing a full-screen error if it is broken.
///
/// # Errors
/// - If the configuration cannot be loaded
pub(crate) fn load_config() -> anyhow::Result<WavegraphConfig> {
    match WavegraphConfig::load() {
        Ok(config) => Ok(config),
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/wavegraph/wavegraph.toml file and try again."
            );
            ui::show_error(&message)?;
            Err(anyhow::anyhow!("Configuration error: {err}"))
        }
    }
}

/// Applies pan, zoom and resize commands. Returns false for anything else.
pub(crate) fn navigate(session: &mut GraphSession, command: GraphCommand) -> bool {
    match command {
        GraphCommand::Pan(delta) => session.pan(delta),
        GraphCommand::ZoomIn => session.zoom_in(),
        GraphCommand::ZoomOut => session.zoom_out(),
        GraphCommand::Resize => session.refresh(),
        _ => return false,
    }
    true
}

/// Footer text for the full-graph view.
pub(crate) fn full_graph_status(session: &GraphSession, sample_count: usize, duration_ms: u64) -> String {
    format!(
        "■ {}  {} samples  zoom {}px  [←/→/drag] pan  [+/-] zoom  [q] quit",
        crate::graph::marker::format_time(duration_ms),
        sample_count,
        session.settings().wave_length().px()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FrozenSamples, Mode, Sample};

    #[test]
    fn test_navigate_handles_only_view_commands() {
        let mut session = GraphSession::default();
        session.show_full_graph(FrozenSamples::from(vec![Sample::new(0, 10)]));
        assert_eq!(session.mode(), Mode::FullGraph);

        let before = session.settings().wave_length().px();
        assert!(navigate(&mut session, GraphCommand::ZoomIn));
        assert_eq!(session.settings().wave_length().px(), (before + 1).min(15));

        assert!(navigate(&mut session, GraphCommand::Pan(-20)));
        assert!(!navigate(&mut session, GraphCommand::Stop));
        assert!(!navigate(&mut session, GraphCommand::Quit));
    }

    #[test]
    fn test_full_graph_status_mentions_duration_and_zoom() {
        let session = GraphSession::default();
        let status = full_graph_status(&session, 42, 65_000);
        assert!(status.contains("01:05"));
        assert!(status.contains("42 samples"));
        assert!(status.contains("zoom 2px"));
    }
}
