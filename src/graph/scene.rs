//! The unit of drawing: everything one frame puts on the surface.

use super::mapper::Glyph;
use super::marker::TimeLabel;
use super::settings::{Palette, Viewport};

/// Distance of the time-label baseline from the top of the surface.
pub const LABEL_BASELINE_PX: i32 = 20;

/// Horizontal line at the live amplitude, from the current-sample x to the right edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Needle {
    pub x_start: i32,
    pub x_end: i32,
    pub y: i32,
}

/// Vertical band marking the current-sample position, full height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerBand {
    pub x_start: i32,
    pub x_end: i32,
    pub height: i32,
}

/// Geometry for one frame, submitted to a surface as a single draw.
///
/// Surfaces clear to `palette.background` before drawing anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub viewport: Viewport,
    pub palette: Palette,
    pub glyphs: Vec<Glyph>,
    pub labels: Vec<TimeLabel>,
    pub needle: Option<Needle>,
    pub marker: Option<MarkerBand>,
}

impl Scene {
    pub fn new(viewport: Viewport, palette: Palette) -> Self {
        Self {
            viewport,
            palette,
            glyphs: Vec::new(),
            labels: Vec::new(),
            needle: None,
            marker: None,
        }
    }

    /// Finds the label anchored at `x`, if any.
    pub fn label_at(&self, x: i32) -> Option<&TimeLabel> {
        self.labels.iter().find(|label| label.x == x)
    }
}
