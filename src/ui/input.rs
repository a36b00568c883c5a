//! Keyboard and mouse handling for the graph view.

use super::terminal::CELL_WIDTH_PX;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;

/// Pixels moved per arrow key press.
pub const PAN_STEP_PX: i64 = 40;

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphCommand {
    /// Nothing to do (no event or an unbound one)
    Continue,
    /// Stop the capture and show the full graph (Enter or 's')
    Stop,
    /// Leave the view (Escape, 'q' or Ctrl+C)
    Quit,
    /// Pause/resume streaming (Space)
    TogglePause,
    /// Move the full graph by this many pixels; positive reveals earlier samples
    Pan(i64),
    ZoomIn,
    ZoomOut,
    /// The terminal was resized
    Resize,
}

/// Turns terminal events into [`GraphCommand`]s. Tracks mouse drags between events.
#[derive(Debug, Default)]
pub struct InputHandler {
    drag_column: Option<u16>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits up to `timeout` for an event.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn poll(&mut self, timeout: Duration) -> anyhow::Result<GraphCommand> {
        if event::poll(timeout)? {
            return Ok(self.translate(event::read()?));
        }
        Ok(GraphCommand::Continue)
    }

    pub fn translate(&mut self, event: Event) -> GraphCommand {
        match event {
            Event::Key(key) => translate_key(key),
            Event::Mouse(mouse) => self.translate_mouse(mouse),
            Event::Resize(cols, rows) => {
                tracing::debug!("Terminal resized to {}x{}", cols, rows);
                GraphCommand::Resize
            }
            _ => GraphCommand::Continue,
        }
    }

    fn translate_mouse(&mut self, mouse: MouseEvent) -> GraphCommand {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_column = Some(mouse.column);
                GraphCommand::Continue
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(previous) = self.drag_column.replace(mouse.column) else {
                    return GraphCommand::Continue;
                };
                let delta = (i64::from(mouse.column) - i64::from(previous)) * i64::from(CELL_WIDTH_PX);
                if delta == 0 {
                    GraphCommand::Continue
                } else {
                    GraphCommand::Pan(delta)
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.drag_column = None;
                GraphCommand::Continue
            }
            _ => GraphCommand::Continue,
        }
    }
}

fn translate_key(key: KeyEvent) -> GraphCommand {
    if key.kind != KeyEventKind::Press {
        return GraphCommand::Continue;
    }

    match key.code {
        KeyCode::Enter | KeyCode::Char('s') => {
            tracing::debug!("Stop requested from keyboard");
            GraphCommand::Stop
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            tracing::debug!("Ctrl+C pressed: quitting");
            GraphCommand::Quit
        }
        KeyCode::Char('q') | KeyCode::Esc => GraphCommand::Quit,
        KeyCode::Char(' ') => GraphCommand::TogglePause,
        KeyCode::Left => GraphCommand::Pan(PAN_STEP_PX),
        KeyCode::Right => GraphCommand::Pan(-PAN_STEP_PX),
        KeyCode::Char('+') | KeyCode::Char('=') => GraphCommand::ZoomIn,
        KeyCode::Char('-') => GraphCommand::ZoomOut,
        _ => GraphCommand::Continue,
    }
}
