//! Terminal drawing surface.
//!
//! Scenes are drawn on a braille canvas, so each terminal cell holds 2×4
//! pixels. The bottom row is a status footer. The marker band is painted as
//! cell background behind the braille dots.

use crate::graph::scene::LABEL_BASELINE_PX;
use crate::graph::{Scene, Surface, Viewport};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::Size,
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Paragraph,
    },
};
use std::io::{self, Stdout};
use std::sync::{Arc, Mutex, PoisonError};

/// Horizontal pixels per terminal cell.
pub const CELL_WIDTH_PX: i32 = 2;
/// Vertical pixels per terminal cell.
pub const CELL_HEIGHT_PX: i32 = 4;

const FOOTER_HEIGHT: u16 = 1;
const OUTLINE_STEPS: usize = 6;

/// Footer text shared between the input loop and the drawing thread.
#[derive(Debug, Clone, Default)]
pub struct StatusLine(Arc<Mutex<String>>);

impl StatusLine {
    pub fn set(&self, text: impl Into<String>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = text.into();
    }

    pub fn get(&self) -> String {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Pixel viewport of a terminal area of `size`, excluding the footer.
pub fn viewport_for(size: Size) -> Viewport {
    Viewport::new(
        i32::from(size.width) * CELL_WIDTH_PX,
        i32::from(size.height.saturating_sub(FOOTER_HEIGHT)) * CELL_HEIGHT_PX,
    )
}

/// Draws `scene` into `area`, with `status` on the bottom row.
pub fn draw_scene(frame: &mut Frame, area: Rect, scene: &Scene, status: &str) {
    let graph_area = Rect {
        height: area.height.saturating_sub(FOOTER_HEIGHT),
        ..area
    };
    let footer_area = Rect {
        y: area.y + graph_area.height,
        height: area.height - graph_area.height,
        ..area
    };

    let palette = scene.palette;
    let width = f64::from(scene.viewport.width);
    let height = f64::from(scene.viewport.height);
    // Scene y grows downward, canvas y grows upward.
    let flip = |y: f64| height - y;

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .background_color(palette.background)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for glyph in &scene.glyphs {
                let outline = glyph.outline(OUTLINE_STEPS);
                for pair in outline.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: pair[0].0,
                        y1: flip(pair[0].1),
                        x2: pair[1].0,
                        y2: flip(pair[1].1),
                        color: palette.wave,
                    });
                }
            }

            if let Some(needle) = scene.needle {
                ctx.draw(&CanvasLine {
                    x1: f64::from(needle.x_start),
                    y1: flip(f64::from(needle.y)),
                    x2: f64::from(needle.x_end),
                    y2: flip(f64::from(needle.y)),
                    color: palette.needle,
                });
            }

            for label in &scene.labels {
                if label.x < 0 || label.x >= scene.viewport.width {
                    continue;
                }
                ctx.print(
                    f64::from(label.x),
                    flip(f64::from(LABEL_BASELINE_PX)),
                    Span::styled(label.text.clone(), Style::default().fg(palette.time_text)),
                );
            }
        });

    frame.render_widget(canvas, graph_area);

    if let Some(marker) = scene.marker {
        let first_col = (marker.x_start.max(0) / CELL_WIDTH_PX) as u16;
        let last_col = ((marker.x_end.max(0) + CELL_WIDTH_PX - 1) / CELL_WIDTH_PX) as u16;
        let buffer = frame.buffer_mut();
        for row in graph_area.top()..graph_area.bottom() {
            for col in first_col..last_col.min(graph_area.width) {
                if let Some(cell) = buffer.cell_mut((graph_area.x + col, row)) {
                    cell.set_bg(palette.marker);
                }
            }
        }
    }

    let footer = Paragraph::new(status.to_string()).style(
        Style::default()
            .fg(palette.time_text)
            .bg(palette.background),
    );
    frame.render_widget(footer, footer_area);
}

/// Full-screen terminal surface.
///
/// Enters raw mode and the alternate screen on creation and restores the
/// terminal when dropped.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: StatusLine,
    restored: bool,
}

impl TerminalSurface {
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    /// - If the terminal cannot be initialized
    pub fn new(status: StatusLine) -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            status,
            restored: false,
        })
    }

    /// Leaves the alternate screen and restores the cursor.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn is_valid(&self) -> bool {
        !self.restored
    }

    fn size(&self) -> Option<Viewport> {
        self.terminal.size().ok().map(viewport_for)
    }

    fn present(&mut self, scene: &Scene) -> anyhow::Result<()> {
        let status = self.status.get();
        self.terminal.draw(|frame| {
            let area = frame.area();
            draw_scene(frame, area, scene, &status);
        })?;
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            tracing::warn!("Failed to restore terminal: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Glyph, MarkerBand, Needle, Palette, TimeLabel};
    use ratatui::backend::TestBackend;

    fn render(scene: &Scene, cols: u16, rows: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(cols, rows)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                draw_scene(frame, area, scene, "● 00:03");
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    #[test]
    fn test_viewport_excludes_footer() {
        assert_eq!(viewport_for(Size::new(40, 11)), Viewport::new(80, 40));
        assert_eq!(viewport_for(Size::new(40, 0)), Viewport::new(80, 0));
    }

    #[test]
    fn test_marker_band_paints_background() {
        let viewport = Viewport::new(80, 40);
        let mut scene = Scene::new(viewport, Palette::default());
        scene.marker = Some(MarkerBand {
            x_start: 60,
            x_end: 80,
            height: 40,
        });

        let buffer = render(&scene, 40, 11);
        assert_eq!(buffer[(35, 3)].bg, Palette::default().marker);
        assert_eq!(buffer[(10, 3)].bg, Palette::default().background);
    }

    #[test]
    fn test_wave_needle_and_label_are_drawn() {
        let viewport = Viewport::new(80, 40);
        let mut scene = Scene::new(viewport, Palette::default());
        scene.glyphs.push(Glyph::for_sample(20, 8, 20, 12));
        scene.needle = Some(Needle {
            x_start: 60,
            x_end: 80,
            y: 8,
        });
        scene.labels.push(TimeLabel {
            x: 0,
            text: "00:00".to_string(),
        });

        let buffer = render(&scene, 40, 11);
        let content: String = (0..10u16)
            .flat_map(|y| (0..40u16).map(move |x| (x, y)))
            .map(|pos| buffer[pos].symbol().to_string())
            .collect();

        assert!(content.contains("00:00"));
        assert!(content.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)));
        let needle_drawn = (0..10u16)
            .flat_map(|y| (30..40u16).map(move |x| (x, y)))
            .any(|pos| buffer[pos].fg == Palette::default().needle);
        assert!(needle_drawn);
        assert_eq!(buffer[(0, 10)].symbol(), "●");
    }
}
