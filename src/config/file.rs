//! Configuration file management for micpulse.
//!
//! Settings live in `~/.config/micpulse/micpulse.toml`. Every field has a
//! default, so a partial or empty file is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::analysis::AnalyzerOptions;
use crate::lifecycle::ControllerOptions;
use crate::visual::radius::{DEFAULT_BASE_FRACTION, DEFAULT_EXPANSION};
use crate::visual::theme::{
    Rgba, DEFAULT_BACKGROUND_COLOR, DEFAULT_INNER_COLOR, DEFAULT_STROKE_COLOR,
};
use crate::visual::{RadiusMapper, RendererKind, Theme};

/// Audio capture and analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `micpulse list-devices`
    /// - device name from `micpulse list-devices`
    pub device: String,
    /// Weight of the previous spectrum, 0 disables smoothing
    pub smoothing: f32,
    /// Level in dB that maps to a silent bin
    pub min_decibels: f32,
    /// Level in dB that maps to a saturated bin
    pub max_decibels: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        let analyzer = AnalyzerOptions::default();
        Self {
            device: "default".to_string(),
            smoothing: analyzer.smoothing,
            min_decibels: analyzer.min_decibels,
            max_decibels: analyzer.max_decibels,
        }
    }
}

/// Rendering and radius configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisualConfig {
    /// "canvas" (polygon redraw) or "element" (eased disc)
    pub renderer: RendererKind,
    /// Resting radius as a share of the shorter viewport side
    pub base_fraction: f64,
    /// Growth at full loudness as a share of the resting radius
    pub expansion: f64,
    /// Frames per second
    pub frame_rate: u32,
    /// Easing time of the element renderer in milliseconds
    pub transition_ms: u64,
    /// Re-open the microphone whenever the terminal is resized
    pub restart_on_resize: bool,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            renderer: RendererKind::default(),
            base_fraction: DEFAULT_BASE_FRACTION,
            expansion: DEFAULT_EXPANSION,
            frame_rate: 60,
            transition_ms: 100,
            restart_on_resize: true,
        }
    }
}

impl VisualConfig {
    /// Radius constants, keeping the default for any that is out of range.
    ///
    /// `base_fraction` must be finite and positive, `expansion` finite and
    /// not negative, so the circle never shrinks below its resting size.
    pub fn radius_mapper(&self) -> RadiusMapper {
        let checked = |name: &str, value: f64, valid: bool, fallback: f64| {
            if valid {
                value
            } else {
                tracing::warn!("Invalid [visual] {name} = {value}; using default {fallback}");
                fallback
            }
        };

        let base = self.base_fraction;
        let expansion = self.expansion;
        RadiusMapper::new(
            checked(
                "base_fraction",
                base,
                base.is_finite() && base > 0.0,
                DEFAULT_BASE_FRACTION,
            ),
            checked(
                "expansion",
                expansion,
                expansion.is_finite() && expansion >= 0.0,
                DEFAULT_EXPANSION,
            ),
        )
    }
}

/// Colors in `#RRGGBB` or `#RRGGBBAA` notation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThemeConfig {
    pub stroke_color: String,
    pub inner_color: String,
    pub background_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            inner_color: DEFAULT_INNER_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
        }
    }
}

impl ThemeConfig {
    /// Parses the colors, keeping the default for any that is invalid.
    pub fn theme(&self) -> Theme {
        let defaults = Theme::default();
        let parse = |value: &str, fallback: Rgba| match value.parse::<Rgba>() {
            Ok(color) => color,
            Err(e) => {
                tracing::warn!("{e}; using default");
                fallback
            }
        };

        Theme {
            stroke: parse(&self.stroke_color, defaults.stroke),
            inner: parse(&self.inner_color, defaults.inner),
            background: parse(&self.background_color, defaults.background),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MicpulseConfig {
    pub audio: AudioConfig,
    pub visual: VisualConfig,
    pub theme: ThemeConfig,
}

impl MicpulseConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(&config_path)?;
        Self::parse(&config_content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    /// - If the TOML is malformed or a value has the wrong type
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: MicpulseConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Frame period derived from `frame_rate`, at least one frame per second.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.visual.frame_rate.clamp(1, 240)))
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            analyzer: AnalyzerOptions {
                smoothing: self.audio.smoothing,
                min_decibels: self.audio.min_decibels,
                max_decibels: self.audio.max_decibels,
            },
            mapper: self.visual.radius_mapper(),
            restart_on_resize: self.visual.restart_on_resize,
            transition: Duration::from_millis(self.visual.transition_ms),
        }
    }
}

/// Retrieves the path to the config file, creating its directory.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not find home directory",
            )
        })?
        .join(".config")
        .join("micpulse");

    fs::create_dir_all(&config_dir)?;

    Ok(config_dir.join("micpulse.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::ViewportSize;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = MicpulseConfig::parse("").unwrap();
        assert_eq!(config, MicpulseConfig::default());
        assert_eq!(config.visual.renderer, RendererKind::Canvas);
        assert_eq!(config.theme.theme(), Theme::default());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = MicpulseConfig::parse(
            r##"
            [visual]
            renderer = "element"
            frame_rate = 30

            [theme]
            background_color = "#000000"
            "##,
        )
        .unwrap();

        assert_eq!(config.visual.renderer, RendererKind::Element);
        assert_eq!(config.visual.base_fraction, 0.15);
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.theme.theme().background, Rgba::opaque(0, 0, 0));
        assert_eq!(config.frame_interval(), Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn test_invalid_color_falls_back() {
        let theme = ThemeConfig {
            stroke_color: "not-a-color".to_string(),
            ..ThemeConfig::default()
        }
        .theme();
        assert_eq!(theme, Theme::default());
    }

    #[test]
    fn test_unknown_renderer_is_rejected() {
        assert!(MicpulseConfig::parse("[visual]\nrenderer = \"bars\"").is_err());
    }

    #[test]
    fn test_controller_options_follow_config() {
        let config = MicpulseConfig::parse(
            "[audio]\nsmoothing = 0.0\n[visual]\nexpansion = 0.5\nrestart_on_resize = false",
        )
        .unwrap();
        let options = config.controller_options();

        assert_eq!(options.analyzer.smoothing, 0.0);
        assert_eq!(options.mapper.expansion, 0.5);
        assert!(!options.restart_on_resize);
        assert_eq!(options.transition, Duration::from_millis(100));
    }

    #[test]
    fn test_out_of_range_radius_constants_fall_back() {
        for visual in [
            "expansion = -2.0",
            "expansion = inf",
            "expansion = nan",
            "base_fraction = 0.0",
            "base_fraction = -0.5",
            "base_fraction = inf",
        ] {
            let config = MicpulseConfig::parse(&format!("[visual]\n{visual}")).unwrap();
            let mapper = config.controller_options().mapper;

            assert!(mapper.base_fraction.is_finite() && mapper.base_fraction > 0.0);
            assert!(mapper.expansion.is_finite() && mapper.expansion >= 0.0);

            let viewport = ViewportSize::new(160.0, 96.0);
            assert!(mapper.map_radius(255, viewport) >= mapper.base_radius(viewport));
        }
    }

    #[test]
    fn test_valid_radius_constants_are_kept() {
        let config =
            MicpulseConfig::parse("[visual]\nbase_fraction = 1500.0\nexpansion = 0.0").unwrap();
        let mapper = config.controller_options().mapper;

        assert_eq!(mapper.base_fraction, 1500.0);
        assert_eq!(mapper.expansion, 0.0);
    }

    #[test]
    fn test_frame_rate_is_clamped() {
        let config = MicpulseConfig::parse("[visual]\nframe_rate = 0").unwrap();
        assert_eq!(config.frame_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_default_template_parses() {
        let config = MicpulseConfig::parse(crate::setup::DEFAULT_CONFIG).unwrap();
        assert_eq!(config, MicpulseConfig::default());
    }
}
