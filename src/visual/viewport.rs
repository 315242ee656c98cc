//! Drawable surface size in device pixels.

use ratatui::layout::Rect;

/// Braille dots per terminal cell, horizontally.
pub const DOTS_PER_CELL_X: u16 = 2;
/// Braille dots per terminal cell, vertically.
pub const DOTS_PER_CELL_Y: u16 = 4;

/// Width and height of the drawable surface in device pixels.
///
/// In a terminal the device pixel is a braille dot, which is close to square,
/// so circles sized in dots stay round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Viewport covered by a terminal area.
    pub fn from_area(area: Rect) -> Self {
        Self {
            width: f64::from(area.width) * f64::from(DOTS_PER_CELL_X),
            height: f64::from(area.height) * f64::from(DOTS_PER_CELL_Y),
        }
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}
