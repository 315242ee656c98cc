//! Frame renderers for the pulsing circle.
//!
//! Both strategies draw a filled, outlined circle centered in the viewport on
//! a cleared background. They only touch the display surface.

pub mod canvas;
pub mod element;
pub mod shapes;

use std::time::{Duration, Instant};

use ratatui::{layout::Rect, Frame};
use serde::{Deserialize, Serialize};

use super::{Palette, ViewportSize};

pub use canvas::CanvasRenderer;
pub use element::ElementRenderer;

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub viewport: ViewportSize,
    pub base_radius: f64,
    pub current_radius: f64,
    pub palette: Palette,
    pub timestamp: Instant,
}

/// Draws one frame of the visualizer.
pub trait FrameRenderer {
    fn kind(&self) -> RendererKind;

    fn render(&mut self, frame: &mut Frame, area: Rect, params: &RenderParams);
}

/// Rendering strategy, selected by configuration.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Resize a styled disc, easing between sizes
    Element,
    /// Clear, fill and stroke a 360-point polygon every frame
    #[default]
    Canvas,
}

impl RendererKind {
    /// Builds a renderer of this kind.
    pub fn build(self, transition: Duration) -> Box<dyn FrameRenderer> {
        match self {
            Self::Element => Box::new(ElementRenderer::new(transition)),
            Self::Canvas => Box::new(CanvasRenderer::new()),
        }
    }

    /// The other strategy.
    pub fn toggled(self) -> Self {
        match self {
            Self::Element => Self::Canvas,
            Self::Canvas => Self::Element,
        }
    }
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Element => write!(f, "element"),
            Self::Canvas => write!(f, "canvas"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_matches_kind() {
        for kind in [RendererKind::Element, RendererKind::Canvas] {
            assert_eq!(kind.build(Duration::from_millis(100)).kind(), kind);
        }
    }

    #[test]
    fn test_toggle_and_display() {
        assert_eq!(RendererKind::Canvas.toggled(), RendererKind::Element);
        assert_eq!(RendererKind::Element.toggled(), RendererKind::Canvas);
        assert_eq!(RendererKind::default().to_string(), "canvas");
    }
}
