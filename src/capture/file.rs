//! Saved captures.
//!
//! A capture is stored as TOML, one `[[samples]]` table per sample.

use crate::graph::{FrozenSamples, Sample};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    #[serde(default)]
    pub samples: Vec<Sample>,
}

impl Capture {
    /// Reads a capture from `path`.
    ///
    /// # Errors
    /// - If the file cannot be read
    /// - If the TOML is malformed
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read capture {}: {e}", path.display()))?;
        let capture: Capture = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid capture file {}: {e}", path.display()))?;
        tracing::debug!(
            "Loaded {} samples from {}",
            capture.samples.len(),
            path.display()
        );
        Ok(capture)
    }

    /// Writes the capture to `path`, replacing any existing file.
    ///
    /// # Errors
    /// - If serialization fails
    /// - If the file cannot be written
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(self)?;
        fs::write(path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write capture {}: {e}", path.display()))?;
        tracing::info!(
            "Saved {} samples to {}",
            self.samples.len(),
            path.display()
        );
        Ok(())
    }

    /// Duration covered by the capture, taken from the last timestamp.
    pub fn duration_ms(&self) -> u64 {
        self.samples.last().map_or(0, |sample| sample.time_ms)
    }
}

impl From<&FrozenSamples> for Capture {
    fn from(samples: &FrozenSamples) -> Self {
        Self {
            samples: samples.to_vec(),
        }
    }
}

impl From<Capture> for FrozenSamples {
    fn from(capture: Capture) -> Self {
        FrozenSamples::from(capture.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_capture_file_layout() {
        let capture = Capture {
            samples: vec![Sample::new(0, 12), Sample::new(150, 3400)],
        };
        let text = toml::to_string(&capture).unwrap();
        assert!(text.contains("[[samples]]"));
        assert!(text.contains("time_ms = 150"));
        assert!(text.contains("amplitude = 3400"));
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("captures").join("take.toml");
        let frozen = FrozenSamples::from(vec![
            Sample::new(0, 0),
            Sample::new(150, 900),
            Sample::new(300, 27_000),
        ]);

        Capture::from(&frozen).save(&path).unwrap();
        let loaded = Capture::load(&path).unwrap();

        assert_eq!(loaded.duration_ms(), 300);
        assert_eq!(FrozenSamples::from(loaded), frozen);
    }

    #[test]
    fn test_empty_file_is_an_empty_capture() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.toml");
        fs::write(&path, "").unwrap();

        let capture = Capture::load(&path).unwrap();
        assert!(capture.samples.is_empty());
        assert_eq!(capture.duration_ms(), 0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Capture::load(&temp_dir.path().join("nope.toml")).is_err());
    }
}
