//! Canvas shapes for the pulsing circle.

use ratatui::style::Color;
use ratatui::widgets::canvas::{Line, Painter, Shape};

/// Vertices of the circle approximation, one per degree.
pub const POLYGON_VERTICES: usize = 360;

/// Fills `out` with 360 points at 1-degree steps around `center`.
///
/// The path is closed implicitly from the last vertex back to the first.
pub fn circle_polygon(center: (f64, f64), radius: f64, out: &mut Vec<(f64, f64)>) {
    out.clear();
    out.extend((0..POLYGON_VERTICES).map(|i| {
        let angle = (i as f64).to_radians();
        (center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
    }));
}

/// Horizontal spans inside a closed polygon at height `y`, even-odd rule.
pub fn scanline_spans(vertices: &[(f64, f64)], y: f64, out: &mut Vec<(f64, f64)>) {
    out.clear();
    if vertices.len() < 3 {
        return;
    }

    let mut crossings: Vec<f64> = Vec::new();
    for (i, &(x0, y0)) in vertices.iter().enumerate() {
        let (x1, y1) = vertices[(i + 1) % vertices.len()];
        // Half-open test so shared vertices count once.
        if (y0 <= y && y < y1) || (y1 <= y && y < y0) {
            crossings.push(x0 + (y - y0) * (x1 - x0) / (y1 - y0));
        }
    }
    crossings.sort_by(f64::total_cmp);

    out.extend(crossings.chunks_exact(2).map(|pair| (pair[0], pair[1])));
}

/// Drawable region of a canvas. Fills never iterate outside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl Clip {
    /// `[0, width] × [0, height]`
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: [0.0, width],
            y: [0.0, height],
        }
    }

    /// Integer rows of `[lo, hi]` that fall inside the clip.
    fn rows(&self, lo: f64, hi: f64) -> Option<(f64, f64)> {
        clamp_range(lo, hi, self.y)
    }

    /// Integer columns of `[lo, hi]` that fall inside the clip.
    fn columns(&self, lo: f64, hi: f64) -> Option<(f64, f64)> {
        clamp_range(lo, hi, self.x)
    }
}

fn clamp_range(lo: f64, hi: f64, bounds: [f64; 2]) -> Option<(f64, f64)> {
    if lo.is_nan() || hi.is_nan() {
        return None;
    }
    let start = lo.ceil().max(bounds[0].floor());
    let end = hi.floor().min(bounds[1].ceil());
    (start.is_finite() && end.is_finite() && start <= end).then_some((start, end))
}

/// Scan-line fill of a closed polygon.
pub struct FilledPolygon<'a> {
    pub vertices: &'a [(f64, f64)],
    pub clip: Clip,
    pub color: Color,
}

impl Shape for FilledPolygon<'_> {
    fn draw(&self, painter: &mut Painter) {
        let Some((min_y, max_y)) = vertical_extent(self.vertices) else {
            return;
        };
        let Some((first, last)) = self.clip.rows(min_y.floor(), max_y.ceil()) else {
            return;
        };

        let mut spans = Vec::new();
        let mut y = first;
        while y <= last {
            scanline_spans(self.vertices, y, &mut spans);
            for &(start, end) in &spans {
                fill_span(painter, &self.clip, start, end, y, self.color);
            }
            y += 1.0;
        }
    }
}

/// Outline of a closed polygon.
pub struct PolygonOutline<'a> {
    pub vertices: &'a [(f64, f64)],
    pub color: Color,
}

impl Shape for PolygonOutline<'_> {
    fn draw(&self, painter: &mut Painter) {
        let count = self.vertices.len();
        for (i, &(x1, y1)) in self.vertices.iter().enumerate() {
            let (x2, y2) = self.vertices[(i + 1) % count];
            Line {
                x1,
                y1,
                x2,
                y2,
                color: self.color,
            }
            .draw(painter);
        }
    }
}

/// Solid disc, filled row by row from the circle equation.
pub struct FilledDisc {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub clip: Clip,
    pub color: Color,
}

impl Shape for FilledDisc {
    fn draw(&self, painter: &mut Painter) {
        let Some((first, last)) = self
            .clip
            .rows((self.y - self.radius).floor(), (self.y + self.radius).ceil())
        else {
            return;
        };

        let mut y = first;
        while y <= last {
            let dy = y - self.y;
            let half_width = (self.radius * self.radius - dy * dy).max(0.0).sqrt();
            if half_width > 0.0 {
                fill_span(
                    painter,
                    &self.clip,
                    self.x - half_width,
                    self.x + half_width,
                    y,
                    self.color,
                );
            }
            y += 1.0;
        }
    }
}

fn fill_span(painter: &mut Painter, clip: &Clip, start: f64, end: f64, y: f64, color: Color) {
    let Some((first, last)) = clip.columns(start, end) else {
        return;
    };
    let mut x = first;
    while x <= last {
        if let Some((px, py)) = painter.get_point(x, y) {
            painter.paint(px, py, color);
        }
        x += 1.0;
    }
}

fn vertical_extent(vertices: &[(f64, f64)]) -> Option<(f64, f64)> {
    vertices.iter().fold(None, |extent, &(_, y)| match extent {
        None => Some((y, y)),
        Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_has_one_vertex_per_degree_on_the_circle() {
        let mut vertices = Vec::new();
        circle_polygon((50.0, 40.0), 12.0, &mut vertices);

        assert_eq!(vertices.len(), 360);
        assert!((vertices[0].0 - 62.0).abs() < 1e-9);
        assert!((vertices[0].1 - 40.0).abs() < 1e-9);
        assert!((vertices[90].0 - 50.0).abs() < 1e-9);
        assert!((vertices[90].1 - 52.0).abs() < 1e-9);
        for &(x, y) in &vertices {
            let distance = ((x - 50.0).powi(2) + (y - 40.0).powi(2)).sqrt();
            assert!((distance - 12.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_polygon_reuses_buffer() {
        let mut vertices = Vec::with_capacity(POLYGON_VERTICES);
        circle_polygon((0.0, 0.0), 1.0, &mut vertices);
        circle_polygon((0.0, 0.0), 2.0, &mut vertices);
        assert_eq!(vertices.len(), POLYGON_VERTICES);
    }

    #[test]
    fn test_scanline_through_square() {
        let square = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let mut spans = Vec::new();

        scanline_spans(&square, 5.0, &mut spans);
        assert_eq!(spans, vec![(0.0, 10.0)]);

        scanline_spans(&square, 11.0, &mut spans);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_clip_limits_rows_and_columns() {
        let clip = Clip::new(160.0, 96.0);

        assert_eq!(clip.rows(-1e12, 1e12), Some((0.0, 96.0)));
        assert_eq!(clip.columns(10.4, 20.6), Some((11.0, 20.0)));
        assert_eq!(clip.columns(200.0, 300.0), None);
        assert_eq!(clip.rows(f64::NEG_INFINITY, f64::INFINITY), Some((0.0, 96.0)));
        assert_eq!(clip.rows(f64::NAN, 5.0), None);
    }

    #[test]
    fn test_scanline_through_circle_center_spans_diameter() {
        let mut vertices = Vec::new();
        circle_polygon((0.0, 0.0), 10.0, &mut vertices);
        let mut spans = Vec::new();

        scanline_spans(&vertices, 0.5, &mut spans);

        assert_eq!(spans.len(), 1);
        let (start, end) = spans[0];
        assert!((start + 10.0).abs() < 0.1);
        assert!((end - 10.0).abs() < 0.1);
    }
}
