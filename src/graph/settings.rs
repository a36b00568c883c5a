//! Render configuration shared by both renderers.
//!
//! Every setter clamps or ignores out-of-range input; nothing here fails.

use ratatui::style::Color;
use std::sync::{Arc, PoisonError, RwLock};

/// Smallest pixel width a single sample may occupy.
pub const MIN_WAVE_LENGTH_PX: i32 = 2;
/// Largest pixel width a single sample may occupy.
pub const MAX_WAVE_LENGTH_PX: i32 = 15;

/// Physical width of one lobe on a density-aware display, in millimetres.
const DEFAULT_WAVE_LENGTH_MM: f32 = 2.6;

pub const DEFAULT_MAX_AMPLITUDE: u32 = 35_000;
pub const DEFAULT_TIME_SCALE_MS: u64 = 5_000;
pub const DEFAULT_X_OFFSET_FRACTION: f64 = 0.75;

/// Pixel width allotted to one sample. Always within
/// [`MIN_WAVE_LENGTH_PX`]..=[`MAX_WAVE_LENGTH_PX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WaveLength(i32);

impl WaveLength {
    /// Clamps `px` into the valid range.
    pub fn new(px: i32) -> Self {
        Self(px.clamp(MIN_WAVE_LENGTH_PX, MAX_WAVE_LENGTH_PX))
    }

    /// Derives the wavelength from horizontal display density (dots per inch).
    pub fn from_dpi(xdpi: f32) -> Self {
        let px = xdpi / (25.4 * DEFAULT_WAVE_LENGTH_MM);
        if px.is_finite() {
            Self::new(px as i32)
        } else {
            Self::new(MIN_WAVE_LENGTH_PX)
        }
    }

    pub fn px(self) -> i32 {
        self.0
    }

    /// One pixel longer, saturating at the maximum.
    pub fn zoomed_in(self) -> Self {
        Self::new(self.0 + 1)
    }

    /// One pixel shorter, saturating at the minimum.
    pub fn zoomed_out(self) -> Self {
        Self::new(self.0 - 1)
    }
}

impl Default for WaveLength {
    fn default() -> Self {
        Self::from_dpi(160.0)
    }
}

/// Colours used when presenting a scene. No behavioural effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub wave: Color,
    pub marker: Color,
    pub needle: Color,
    pub time_text: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::Rgb(0, 0, 0),
            wave: Color::Rgb(255, 255, 255),
            marker: Color::Rgb(30, 30, 30),
            needle: Color::Rgb(250, 0, 0),
            time_text: Color::Rgb(250, 250, 250),
        }
    }
}

/// Pixel dimensions of a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
        }
    }

    pub fn half_height(&self) -> i32 {
        self.height / 2
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Per-renderer configuration, fully valid from construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSettings {
    wave_length: WaveLength,
    max_amplitude: u32,
    time_scale_ms: u64,
    x_offset_fraction: f64,
    pub palette: Palette,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self::new(WaveLength::default())
    }
}

impl GraphSettings {
    pub fn new(wave_length: WaveLength) -> Self {
        Self {
            wave_length,
            max_amplitude: DEFAULT_MAX_AMPLITUDE,
            time_scale_ms: DEFAULT_TIME_SCALE_MS,
            x_offset_fraction: DEFAULT_X_OFFSET_FRACTION,
            palette: Palette::default(),
        }
    }

    pub fn wave_length(&self) -> WaveLength {
        self.wave_length
    }

    pub fn set_wave_length(&mut self, px: i32) {
        self.wave_length = WaveLength::new(px);
    }

    pub fn max_amplitude(&self) -> u32 {
        self.max_amplitude
    }

    /// Zero would divide by zero in the amplitude mapping, so it becomes 1.
    pub fn set_max_amplitude(&mut self, max_amplitude: u32) {
        self.max_amplitude = max_amplitude.max(1);
    }

    pub fn time_scale_ms(&self) -> u64 {
        self.time_scale_ms
    }

    pub fn set_time_scale(&mut self, time_scale_ms: u64) {
        self.time_scale_ms = time_scale_ms.max(1);
    }

    pub fn x_offset_fraction(&self) -> f64 {
        self.x_offset_fraction
    }

    /// Values outside the open interval (0, 1) are ignored.
    pub fn set_x_offset_fraction(&mut self, fraction: f64) {
        if fraction > 0.0 && fraction < 1.0 {
            self.x_offset_fraction = fraction;
        } else {
            tracing::debug!("Ignoring x offset fraction {} outside (0, 1)", fraction);
        }
    }

    pub fn with_max_amplitude(mut self, max_amplitude: u32) -> Self {
        self.set_max_amplitude(max_amplitude);
        self
    }

    pub fn with_time_scale(mut self, time_scale_ms: u64) -> Self {
        self.set_time_scale(time_scale_ms);
        self
    }

    pub fn with_x_offset_fraction(mut self, fraction: f64) -> Self {
        self.set_x_offset_fraction(fraction);
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }
}

/// Settings shared between the UI thread and a renderer thread.
///
/// Renderers copy the settings once per frame so a frame never mixes two configurations.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings(Arc<RwLock<GraphSettings>>);

impl SharedSettings {
    pub fn new(settings: GraphSettings) -> Self {
        Self(Arc::new(RwLock::new(settings)))
    }

    pub fn get(&self) -> GraphSettings {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update<F>(&self, f: F) -> GraphSettings
    where
        F: FnOnce(&mut GraphSettings),
    {
        let mut settings = self.0.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut settings);
        *settings
    }
}
