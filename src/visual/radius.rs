//! Loudness to circle radius.

use super::ViewportSize;

/// Share of the shorter viewport side used as the resting radius.
pub const DEFAULT_BASE_FRACTION: f64 = 0.15;
/// Growth at full amplitude, as a share of the resting radius.
pub const DEFAULT_EXPANSION: f64 = 0.9;

/// Maps an amplitude in [0, 255] to a radius in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusMapper {
    pub base_fraction: f64,
    pub expansion: f64,
}

impl Default for RadiusMapper {
    fn default() -> Self {
        Self {
            base_fraction: DEFAULT_BASE_FRACTION,
            expansion: DEFAULT_EXPANSION,
        }
    }
}

impl RadiusMapper {
    pub fn new(base_fraction: f64, expansion: f64) -> Self {
        Self {
            base_fraction,
            expansion,
        }
    }

    /// Radius at zero amplitude.
    pub fn base_radius(&self, viewport: ViewportSize) -> f64 {
        viewport.min_side() * self.base_fraction
    }

    /// `base + (amplitude / 255) * base * expansion`
    pub fn map_radius(&self, amplitude: u8, viewport: ViewportSize) -> f64 {
        let base = self.base_radius(viewport);
        base + (f64::from(amplitude) / 255.0) * base * self.expansion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_base_radius_uses_shorter_side() {
        let mapper = RadiusMapper::default();
        assert!((mapper.base_radius(ViewportSize::new(800.0, 600.0)) - 90.0).abs() < EPSILON);
        assert!((mapper.base_radius(ViewportSize::new(600.0, 800.0)) - 90.0).abs() < EPSILON);
    }

    #[test]
    fn test_radius_bounds() {
        let mapper = RadiusMapper::default();
        let viewport = ViewportSize::new(800.0, 600.0);

        assert!((mapper.map_radius(0, viewport) - 90.0).abs() < EPSILON);
        assert!((mapper.map_radius(255, viewport) - 90.0 * 1.9).abs() < EPSILON);
    }

    #[test]
    fn test_midpoint_amplitude() {
        let mapper = RadiusMapper::default();
        let radius = mapper.map_radius(128, ViewportSize::new(800.0, 600.0));
        let expected = 90.0 + (128.0 / 255.0) * 90.0 * 0.9;

        assert!((radius - expected).abs() < EPSILON);
        assert!((radius - 130.66).abs() < 0.01);
    }

    #[test]
    fn test_radius_is_monotonic_in_amplitude() {
        let mapper = RadiusMapper::default();
        for viewport in [
            ViewportSize::new(800.0, 600.0),
            ViewportSize::new(160.0, 96.0),
            ViewportSize::new(0.0, 400.0),
        ] {
            let base = mapper.base_radius(viewport);
            let mut previous = mapper.map_radius(0, viewport);
            for amplitude in 1..=255u8 {
                let radius = mapper.map_radius(amplitude, viewport);
                assert!(radius >= previous);
                assert!(radius >= base && radius <= base * 1.9 + EPSILON);
                previous = radius;
            }
        }
    }

    #[test]
    fn test_custom_constants() {
        let mapper = RadiusMapper::new(0.25, 1.0);
        let viewport = ViewportSize::new(100.0, 200.0);
        assert!((mapper.map_radius(255, viewport) - 50.0).abs() < EPSILON);
    }
}
