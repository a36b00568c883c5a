//! Mapping from sample index and amplitude to pixel geometry.

/// Vertical extent of a sample around the centre line.
///
/// Integer arithmetic, so the result is monotonic non-decreasing in `amplitude`.
/// Amplitudes above `max_amplitude` are clamped to `half_height`.
pub fn amp_to_y(amplitude: u32, half_height: i32, max_amplitude: u32) -> i32 {
    let max_amplitude = i64::from(max_amplitude.max(1));
    let half_height = i64::from(half_height.max(0));
    let dy = half_height * i64::from(amplitude) / max_amplitude;
    dy.min(half_height) as i32
}

/// X position of the sample `step_index` steps behind the newest one (streaming mode).
///
/// Samples scroll right to left as time advances.
pub fn streaming_x(base_x: i32, step_index: i32, wave_length: i32) -> i32 {
    base_x - step_index * wave_length
}

/// X position of the sample at `index` in full-graph mode (left to right).
pub fn full_graph_x(index: usize, wave_length: i32) -> i64 {
    index as i64 * i64::from(wave_length)
}

/// The per-sample waveform glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Two half-ovals, the first above the centre line and the second below,
    /// each half a wavelength wide, peaking at `dy`.
    Lobe {
        x: i32,
        width: i32,
        center_y: i32,
        dy: i32,
    },
    /// Zero amplitude: a flat segment on the centre line.
    Flat { x: i32, width: i32, center_y: i32 },
}

impl Glyph {
    /// Builds the glyph starting at `x` and spanning exactly `width` pixels.
    pub fn for_sample(x: i32, width: i32, center_y: i32, dy: i32) -> Self {
        if dy > 0 {
            Glyph::Lobe {
                x,
                width,
                center_y,
                dy,
            }
        } else {
            Glyph::Flat { x, width, center_y }
        }
    }

    pub fn x(&self) -> i32 {
        match *self {
            Glyph::Lobe { x, .. } | Glyph::Flat { x, .. } => x,
        }
    }

    pub fn width(&self) -> i32 {
        match *self {
            Glyph::Lobe { width, .. } | Glyph::Flat { width, .. } => width,
        }
    }

    pub fn dy(&self) -> i32 {
        match *self {
            Glyph::Lobe { dy, .. } => dy,
            Glyph::Flat { .. } => 0,
        }
    }

    /// Samples the glyph outline as a polyline in pixel coordinates (y grows downward).
    ///
    /// `steps` points per half-oval; a flat glyph is always two points.
    pub fn outline(&self, steps: usize) -> Vec<(f64, f64)> {
        match *self {
            Glyph::Flat { x, width, center_y } => vec![
                (f64::from(x), f64::from(center_y)),
                (f64::from(x + width), f64::from(center_y)),
            ],
            Glyph::Lobe {
                x,
                width,
                center_y,
                dy,
            } => {
                let steps = steps.max(2);
                let half = f64::from(width) / 2.0;
                let rx = half / 2.0;
                let cy = f64::from(center_y);
                let dy = f64::from(dy);
                let mut points = Vec::with_capacity(steps * 2);

                // Upper half-oval, left to right.
                let cx = f64::from(x) + rx;
                for i in 0..steps {
                    let t = std::f64::consts::PI * (1.0 - i as f64 / (steps - 1) as f64);
                    points.push((cx + rx * t.cos(), cy - dy * t.sin()));
                }

                // Lower half-oval, left to right.
                let cx = f64::from(x) + half + rx;
                for i in 1..steps {
                    let t = std::f64::consts::PI * (1.0 - i as f64 / (steps - 1) as f64);
                    points.push((cx + rx * t.cos(), cy + dy * t.sin()));
                }

                points
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amp_to_y_scales_linearly() {
        assert_eq!(amp_to_y(2000, 100, 4000), 50);
        assert_eq!(amp_to_y(0, 100, 4000), 0);
        assert_eq!(amp_to_y(4000, 100, 4000), 100);
    }

    #[test]
    fn test_amp_to_y_is_monotonic() {
        let mut previous = 0;
        for amplitude in (0..40_000).step_by(97) {
            let dy = amp_to_y(amplitude, 123, 35_000);
            assert!(dy >= previous);
            previous = dy;
        }
    }

    #[test]
    fn test_amp_to_y_is_symmetric_around_center() {
        let half_height = 80;
        for amplitude in [0, 1, 500, 17_500, 35_000] {
            let dy = amp_to_y(amplitude, half_height, 35_000);
            let top = half_height - dy;
            let bottom = half_height + dy;
            assert_eq!(half_height - top, bottom - half_height);
        }
    }

    #[test]
    fn test_amp_to_y_clamps_to_half_height() {
        assert_eq!(amp_to_y(u32::MAX, 100, 10), 100);
        assert_eq!(amp_to_y(10, 100, 0), 100);
    }

    #[test]
    fn test_index_to_x() {
        assert_eq!(streaming_x(300, 0, 8), 300);
        assert_eq!(streaming_x(300, 3, 8), 276);
        assert_eq!(full_graph_x(0, 10), 0);
        assert_eq!(full_graph_x(7, 10), 70);
    }

    #[test]
    fn test_glyph_selection() {
        assert!(matches!(Glyph::for_sample(0, 8, 50, 0), Glyph::Flat { .. }));
        assert!(matches!(Glyph::for_sample(0, 8, 50, 3), Glyph::Lobe { .. }));
    }

    #[test]
    fn test_lobe_outline_spans_one_wavelength() {
        let glyph = Glyph::for_sample(10, 8, 50, 20);
        let outline = glyph.outline(9);

        let min_x = outline.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let max_x = outline.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = outline.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = outline.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

        assert!((min_x - 10.0).abs() < 1e-9);
        assert!((max_x - 18.0).abs() < 1e-9);
        assert!((min_y - 30.0).abs() < 1e-9);
        assert!((max_y - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_outline() {
        let outline = Glyph::for_sample(4, 6, 20, 0).outline(9);
        assert_eq!(outline, vec![(4.0, 20.0), (10.0, 20.0)]);
    }
}
