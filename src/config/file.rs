//! Configuration file management for wavegraph.
//!
//! Settings live in a TOML file in the user's config directory. Every section
//! and field is optional; anything missing falls back to its default.

use crate::graph::{GraphSettings, Palette, WaveLength};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Rendering defaults applied to each new session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Pixel width of one sample (2-15). Also the zoom level.
    #[serde(default = "default_wave_length_px")]
    pub wave_length_px: i32,
    /// Amplitude that maps to the full half-height of the view
    #[serde(default = "default_max_amplitude")]
    pub max_amplitude: u32,
    /// Interval between time labels in milliseconds
    #[serde(default = "default_time_scale_ms")]
    pub time_scale_ms: u64,
    /// Horizontal position of the newest sample, as a fraction of the view width
    #[serde(default = "default_x_offset_fraction")]
    pub x_offset_fraction: f64,
}

fn default_wave_length_px() -> i32 {
    8
}

fn default_max_amplitude() -> u32 {
    crate::graph::settings::DEFAULT_MAX_AMPLITUDE
}

fn default_time_scale_ms() -> u64 {
    crate::graph::settings::DEFAULT_TIME_SCALE_MS
}

fn default_x_offset_fraction() -> f64 {
    crate::graph::settings::DEFAULT_X_OFFSET_FRACTION
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            wave_length_px: default_wave_length_px(),
            max_amplitude: default_max_amplitude(),
            time_scale_ms: default_time_scale_ms(),
            x_offset_fraction: default_x_offset_fraction(),
        }
    }
}

/// Synthetic capture source used by `wavegraph live`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Milliseconds between samples
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// Loudest amplitude the generator produces
    #[serde(default = "default_peak_amplitude")]
    pub peak_amplitude: u32,
}

fn default_sample_interval_ms() -> u64 {
    150
}

fn default_peak_amplitude() -> u32 {
    30_000
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            peak_amplitude: default_peak_amplitude(),
        }
    }
}

/// Colours as `[r, g, b]` triples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorsConfig {
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    #[serde(default = "default_wave")]
    pub wave: [u8; 3],
    #[serde(default = "default_marker")]
    pub marker: [u8; 3],
    #[serde(default = "default_needle")]
    pub needle: [u8; 3],
    #[serde(default = "default_time_text")]
    pub time_text: [u8; 3],
}

fn default_background() -> [u8; 3] {
    [0, 0, 0]
}

fn default_wave() -> [u8; 3] {
    [255, 255, 255]
}

fn default_marker() -> [u8; 3] {
    [30, 30, 30]
}

fn default_needle() -> [u8; 3] {
    [250, 0, 0]
}

fn default_time_text() -> [u8; 3] {
    [250, 250, 250]
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            wave: default_wave(),
            marker: default_marker(),
            needle: default_needle(),
            time_text: default_time_text(),
        }
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}

impl ColorsConfig {
    pub fn palette(&self) -> Palette {
        Palette {
            background: rgb(self.background),
            wave: rgb(self.wave),
            marker: rgb(self.marker),
            needle: rgb(self.needle),
            time_text: rgb(self.time_text),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WavegraphConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
}

impl WavegraphConfig {
    /// Loads configuration from the user's config directory, writing the
    /// defaults there first if the file does not exist yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be read or written
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        Self::load_or_init(&get_config_path()?)
    }

    /// Loads configuration from `path`.
    ///
    /// # Errors
    /// - If the file cannot be read
    /// - If the TOML is malformed
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config_content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        let config: WavegraphConfig = toml::from_str(&config_content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Loads `path`, or creates it with default values when missing.
    ///
    /// # Errors
    /// - If the file exists but cannot be read or parsed
    /// - If the default file cannot be written
    pub fn load_or_init(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Self::default();
        config.save_to(path)?;
        tracing::info!("Wrote default configuration to {}", path.display());
        Ok(config)
    }

    /// Saves configuration to `path`, creating parent directories as needed.
    ///
    /// # Errors
    /// - If the directory cannot be created
    /// - If the file cannot be written
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config_content = toml::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        tracing::debug!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Builds the render settings for a new session. Out-of-range values are clamped.
    pub fn graph_settings(&self) -> GraphSettings {
        GraphSettings::new(WaveLength::new(self.graph.wave_length_px))
            .with_max_amplitude(self.graph.max_amplitude)
            .with_time_scale(self.graph.time_scale_ms)
            .with_x_offset_fraction(self.graph.x_offset_fraction)
            .with_palette(self.colors.palette())
    }
}

/// Retrieves the path to the config file, creating its directory.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("wavegraph");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("wavegraph.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: WavegraphConfig = toml::from_str("[graph]\nwave_length_px = 12\n").unwrap();
        assert_eq!(config.graph.wave_length_px, 12);
        assert_eq!(config.graph.max_amplitude, 35_000);
        assert_eq!(config.capture, CaptureConfig::default());
        assert_eq!(config.colors, ColorsConfig::default());
    }

    #[test]
    fn test_load_or_init_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("wavegraph.toml");

        let config = WavegraphConfig::load_or_init(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, WavegraphConfig::default());

        let mut edited = config.clone();
        edited.capture.sample_interval_ms = 40;
        edited.colors.wave = [0, 200, 0];
        edited.save_to(&path).unwrap();

        let reloaded = WavegraphConfig::load_or_init(&path).unwrap();
        assert_eq!(reloaded, edited);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wavegraph.toml");
        fs::write(&path, "[graph\nwave_length_px = ").unwrap();

        assert!(WavegraphConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_graph_settings_are_clamped() {
        let mut config = WavegraphConfig::default();
        config.graph.wave_length_px = 40;
        config.graph.max_amplitude = 0;
        config.graph.x_offset_fraction = 3.0;
        config.colors.needle = [1, 2, 3];

        let settings = config.graph_settings();
        assert_eq!(settings.wave_length().px(), 15);
        assert_eq!(settings.max_amplitude(), 1);
        assert_eq!(settings.x_offset_fraction(), 0.75);
        assert_eq!(settings.palette.needle, Color::Rgb(1, 2, 3));
    }

    #[test]
    fn test_default_colours_match_palette() {
        assert_eq!(ColorsConfig::default().palette(), Palette::default());
    }
}
