//! Polygon renderer: the whole surface is redrawn every frame.

use ratatui::{
    layout::Rect,
    symbols::Marker,
    widgets::canvas::{Canvas, Context},
    Frame,
};

use super::shapes::{circle_polygon, Clip, FilledPolygon, PolygonOutline, POLYGON_VERTICES};
use super::{FrameRenderer, RenderParams, RendererKind};

/// Clears to the background, then fills and strokes a 360-point polygon.
pub struct CanvasRenderer {
    vertices: Vec<(f64, f64)>,
}

impl CanvasRenderer {
    pub fn new() -> Self {
        Self {
            vertices: Vec::with_capacity(POLYGON_VERTICES),
        }
    }
}

impl Default for CanvasRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRenderer for CanvasRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Canvas
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, params: &RenderParams) {
        circle_polygon(
            params.viewport.center(),
            params.current_radius,
            &mut self.vertices,
        );

        let vertices = self.vertices.as_slice();
        let clip = Clip::new(params.viewport.width, params.viewport.height);
        let palette = params.palette;
        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .background_color(palette.background)
            .x_bounds([0.0, params.viewport.width])
            .y_bounds([0.0, params.viewport.height])
            .paint(|ctx: &mut Context| {
                ctx.draw(&FilledPolygon {
                    vertices,
                    clip,
                    color: palette.fill,
                });
                ctx.layer();
                ctx.draw(&PolygonOutline {
                    vertices,
                    color: palette.stroke,
                });
            });

        frame.render_widget(canvas, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::render::testing::{count_fg, render_params, render_to_buffer};
    use std::time::Instant;

    #[test]
    fn test_circle_is_centered_with_outline() {
        let mut renderer = CanvasRenderer::new();
        let (buffer, params) = render_to_buffer(&mut renderer, 40, 20, 0, Instant::now());
        let palette = params.palette;

        let center = buffer.cell((20, 10)).unwrap();
        assert_eq!(center.fg, palette.fill);
        assert_ne!(center.symbol(), " ");

        let corner = buffer.cell((0, 0)).unwrap();
        assert_eq!(corner.bg, palette.background);
        assert_eq!(corner.symbol(), " ");

        assert!(count_fg(&buffer, palette.stroke) > 0);
    }

    #[test]
    fn test_louder_frames_cover_more_cells() {
        let mut renderer = CanvasRenderer::new();
        let now = Instant::now();

        let (quiet, params) = render_to_buffer(&mut renderer, 60, 30, 0, now);
        let (loud, _) = render_to_buffer(&mut renderer, 60, 30, 255, now);

        let painted = |buffer: &ratatui::buffer::Buffer| {
            buffer
                .content()
                .iter()
                .filter(|cell| cell.symbol() != " ")
                .count()
        };
        assert!(painted(&loud) > painted(&quiet));
        assert_eq!(renderer.vertices.len(), 360);
        assert!(params.current_radius >= params.base_radius);
    }

    #[test]
    fn test_oversized_polygon_is_clipped() {
        let mut renderer = CanvasRenderer::new();
        let (_, mut params) = render_to_buffer(&mut renderer, 40, 20, 0, Instant::now());
        params.current_radius = 1.0e12;

        let buffer = render_params(&mut renderer, 40, 20, &params);

        assert_eq!(buffer.cell((20, 10)).unwrap().fg, params.palette.fill);
    }
}
