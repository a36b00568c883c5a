//! Full-screen error message for failures that happen before or during the graph view.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

const ERROR_BACKGROUND: Color = Color::Rgb(120, 0, 0);

/// Draws `message` centred on a red background.
pub fn draw_error(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" wavegraph ")
        .style(Style::default().bg(ERROR_BACKGROUND).fg(Color::White));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text_height = (message.lines().count() as u16).min(inner.height);
    let [_, text_area, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(text_height),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let paragraph = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, text_area);
}

/// Error screen that waits for a key press before returning.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

impl ErrorScreen {
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    /// Shows `message` until any key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering or event polling fails
    pub fn show_error(&mut self, message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                draw_error(frame, area, message);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    return Ok(());
                }
            }
        }
    }

    /// # Errors
    /// - If terminal mode cannot be restored
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Shows `message` on an error screen and restores the terminal afterwards.
///
/// # Errors
/// - If the terminal cannot be used
pub fn show_error(message: &str) -> anyhow::Result<()> {
    let mut screen = ErrorScreen::new()?;
    screen.show_error(message)?;
    screen.cleanup()
}
