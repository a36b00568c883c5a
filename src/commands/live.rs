//! Live capture.
//!
//! Streams a synthetic capture onto a scrolling graph, then switches to the
//! pannable full graph once the capture is stopped. Supports an external stop
//! trigger via the SIGUSR1 signal.

use super::{full_graph_status, load_config, navigate, INPUT_POLL};
use crate::capture::{Capture, SyntheticRecorder};
use crate::graph::marker::format_time;
use crate::graph::{FrozenSamples, GraphSession, Mode};
use crate::ui::{GraphCommand, InputHandler, StatusLine, TerminalSurface};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Runs a live capture until the user quits.
///
/// With `save`, the capture is written to that file once it stops.
///
/// # Errors
/// - If the configuration is invalid
/// - If the terminal or the capture thread cannot be started
/// - If the capture cannot be saved
pub fn handle_live(save: Option<PathBuf>) -> anyhow::Result<()> {
    tracing::info!("=== wavegraph live capture started ===");

    let config = load_config()?;
    tracing::info!(
        "Configuration loaded: interval={}ms, wave_length={}px, max_amplitude={}",
        config.capture.sample_interval_ms,
        config.graph.wave_length_px,
        config.graph.max_amplitude
    );

    let stop_signal = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&stop_signal))
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    let status = StatusLine::default();
    let surface = TerminalSurface::new(status.clone())
        .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    let mut session = GraphSession::new(config.graph_settings());
    session.attach_to_surface(Box::new(surface));
    session.on_recording_started();

    let mut recorder = SyntheticRecorder::new(
        config.capture.sample_interval_ms,
        config.capture.peak_amplitude,
    );
    recorder.start_recording(session.sample_sink())?;

    let mut input = InputHandler::new();
    let started = Instant::now();
    let mut captured: Option<FrozenSamples> = None;
    let mut last_status = String::new();

    loop {
        if stop_signal.swap(false, Ordering::AcqRel) && captured.is_none() {
            tracing::info!("Received SIGUSR1: stopping capture via external trigger");
            captured = Some(finish_capture(&mut session, &mut recorder, save.as_deref())?);
        }

        let text = match &captured {
            None => live_status(&session, recorder.is_paused(), started),
            Some(samples) => {
                full_graph_status(&session, samples.len(), samples.last().map_or(0, |s| s.time_ms))
            }
        };
        if text != last_status {
            status.set(text.clone());
            last_status = text;
            // Streaming frames pick up the footer on their own.
            if session.mode() == Mode::FullGraph {
                session.refresh();
            }
        }

        let command = input.poll(INPUT_POLL)?;
        match command {
            GraphCommand::Quit => break,
            GraphCommand::Stop if captured.is_none() => {
                captured = Some(finish_capture(&mut session, &mut recorder, save.as_deref())?);
            }
            GraphCommand::TogglePause if captured.is_none() => {
                recorder.toggle_pause();
                if recorder.is_paused() {
                    session.pause();
                } else {
                    session.resume();
                }
            }
            command => {
                navigate(&mut session, command);
            }
        }
    }

    if captured.is_none() {
        tracing::debug!("Quit during capture");
        finish_capture(&mut session, &mut recorder, save.as_deref())?;
    }

    drop(session);
    tracing::info!("=== wavegraph live capture exited successfully ===");
    Ok(())
}

/// Stops the recorder and the streaming graph, shows the full graph and saves it if asked.
fn finish_capture(
    session: &mut GraphSession,
    recorder: &mut SyntheticRecorder,
    save: Option<&Path>,
) -> anyhow::Result<FrozenSamples> {
    recorder.stop_recording();
    let samples = session.on_recording_stopped();

    if let Some(path) = save {
        Capture::from(&samples).save(path)?;
    }
    Ok(samples)
}

fn live_status(session: &GraphSession, paused: bool, started: Instant) -> String {
    let indicator = if paused { "⏸" } else { "●" };
    format!(
        "{} {}  {} samples  [space] pause  [enter] stop  [q] quit",
        indicator,
        format_time(started.elapsed().as_millis() as u64),
        session.sample_count()
    )
}
