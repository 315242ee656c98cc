//! Hex colors and their terminal palette.
//!
//! Terminal cells are opaque, so alpha is resolved up front by blending each
//! color over the one beneath it: background over black, fill over
//! background, stroke over fill.

use ratatui::style::Color;
use std::str::FromStr;

pub const DEFAULT_STROKE_COLOR: &str = "#E0C09790";
pub const DEFAULT_INNER_COLOR: &str = "#E0C09780";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#2D2424";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeError {
    #[error("Invalid color '{0}': expected #RGB, #RGBA, #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),
}

/// A color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Composites `self` over an opaque `base`.
    pub fn over(self, base: Rgba) -> Rgba {
        let alpha = u32::from(self.a);
        let mix = |top: u8, bottom: u8| -> u8 {
            ((u32::from(top) * alpha + u32::from(bottom) * (255 - alpha) + 127) / 255) as u8
        };
        Rgba::opaque(mix(self.r, base.r), mix(self.g, base.g), mix(self.b, base.b))
    }

    pub fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

impl FromStr for Rgba {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ThemeError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let nibble = |i: usize| {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|v| v * 17)
                .map_err(|_| invalid())
        };

        match hex.len() {
            3 => Ok(Rgba::opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Ok(Rgba {
                a: nibble(3)?,
                ..Rgba::opaque(nibble(0)?, nibble(1)?, nibble(2)?)
            }),
            6 => Ok(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Rgba {
                a: byte(6)?,
                ..Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)
            }),
            _ => Err(invalid()),
        }
    }
}

/// Stroke, fill and background colors of the visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub stroke: Rgba,
    pub inner: Rgba,
    pub background: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            stroke: Rgba { r: 0xE0, g: 0xC0, b: 0x97, a: 0x90 },
            inner: Rgba { r: 0xE0, g: 0xC0, b: 0x97, a: 0x80 },
            background: Rgba::opaque(0x2D, 0x24, 0x24),
        }
    }
}

impl Theme {
    /// Parses all three colors.
    ///
    /// # Errors
    /// - If any color is not a valid hex color
    pub fn from_hex(stroke: &str, inner: &str, background: &str) -> Result<Self, ThemeError> {
        Ok(Self {
            stroke: stroke.parse()?,
            inner: inner.parse()?,
            background: background.parse()?,
        })
    }

    /// Opaque terminal colors with alpha resolved.
    pub fn palette(&self) -> Palette {
        let background = self.background.over(Rgba::BLACK);
        let fill = self.inner.over(background);
        let stroke = self.stroke.over(fill);
        Palette {
            stroke: stroke.to_color(),
            fill: fill.to_color(),
            background: background.to_color(),
            text: Color::White,
        }
    }
}

/// Colors as drawn to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub stroke: Color,
    pub fill: Color,
    pub background: Color,
    pub text: Color,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!("#2D2424".parse::<Rgba>().unwrap(), Rgba::opaque(0x2D, 0x24, 0x24));
        assert_eq!(
            "#E0C09790".parse::<Rgba>().unwrap(),
            Rgba { r: 0xE0, g: 0xC0, b: 0x97, a: 0x90 }
        );
        assert_eq!("#fff".parse::<Rgba>().unwrap(), Rgba::opaque(255, 255, 255));
        assert_eq!("#0008".parse::<Rgba>().unwrap().a, 0x88);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "2D2424", "#2D242", "#GGGGGG", "#2D2424FF00", "#é0"] {
            assert!(input.parse::<Rgba>().is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_blend_extremes() {
        let red = Rgba::opaque(255, 0, 0);
        let clear = Rgba { a: 0, ..Rgba::opaque(0, 255, 0) };

        assert_eq!(red.over(Rgba::BLACK), red);
        assert_eq!(clear.over(red), red);
    }

    #[test]
    fn test_blend_half_alpha() {
        let white_half = Rgba { a: 128, ..Rgba::opaque(255, 255, 255) };
        let blended = white_half.over(Rgba::BLACK);
        assert_eq!(blended, Rgba::opaque(128, 128, 128));
    }

    #[test]
    fn test_default_theme_matches_hex_defaults() {
        let parsed = Theme::from_hex(
            DEFAULT_STROKE_COLOR,
            DEFAULT_INNER_COLOR,
            DEFAULT_BACKGROUND_COLOR,
        )
        .unwrap();
        assert_eq!(parsed, Theme::default());

        let palette = parsed.palette();
        assert_eq!(palette.background, Color::Rgb(0x2D, 0x24, 0x24));
        assert_ne!(palette.fill, palette.background);
        assert_ne!(palette.stroke, palette.fill);
    }
}
