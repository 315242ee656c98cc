//! Element renderer: a disc laid out in the middle of the screen whose size
//! eases toward each new radius.

use std::time::{Duration, Instant};

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::Style,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Context},
        Block,
    },
    Frame,
};

use super::shapes::{Clip, FilledDisc};
use super::{FrameRenderer, RenderParams, RendererKind};
use crate::visual::viewport::{DOTS_PER_CELL_X, DOTS_PER_CELL_Y};

/// Sizes a centered disc element to `2 × radius`.
///
/// The displayed size eases toward the target, which itself changes once per
/// frame. The easing is cosmetic and never feeds back into the radius.
pub struct ElementRenderer {
    transition: Duration,
    eased: Option<Transition>,
}

impl ElementRenderer {
    pub fn new(transition: Duration) -> Self {
        Self {
            transition,
            eased: None,
        }
    }

    /// Radius to draw at `now`, after retargeting toward `target`.
    fn displayed_radius(&mut self, target: f64, now: Instant) -> f64 {
        match &mut self.eased {
            Some(transition) => {
                transition.retarget(target, now);
                transition.value_at(now)
            }
            None => {
                self.eased = Some(Transition::settled(target, now, self.transition));
                target
            }
        }
    }
}

impl FrameRenderer for ElementRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Element
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, params: &RenderParams) {
        let radius = self.displayed_radius(params.current_radius, params.timestamp);
        let palette = params.palette;

        frame.render_widget(
            Block::default().style(Style::default().bg(palette.background)),
            area,
        );

        // One spare cell on each axis keeps the outline inside the element.
        let diameter = 2.0 * radius;
        // Float-to-int casts saturate, so oversized discs just fill the area.
        let cols = ((diameter / f64::from(DOTS_PER_CELL_X)).ceil() as u16).saturating_add(1);
        let rows = ((diameter / f64::from(DOTS_PER_CELL_Y)).ceil() as u16).saturating_add(1);

        let [column] = Layout::horizontal([Constraint::Length(cols)])
            .flex(Flex::Center)
            .areas(area);
        let [element] = Layout::vertical([Constraint::Length(rows)])
            .flex(Flex::Center)
            .areas(column);

        let width = f64::from(element.width) * f64::from(DOTS_PER_CELL_X);
        let height = f64::from(element.height) * f64::from(DOTS_PER_CELL_Y);
        let (x, y) = (width / 2.0, height / 2.0);

        let disc = Canvas::default()
            .marker(Marker::Braille)
            .background_color(palette.background)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(move |ctx: &mut Context| {
                ctx.draw(&FilledDisc {
                    x,
                    y,
                    radius,
                    clip: Clip::new(width, height),
                    color: palette.fill,
                });
                ctx.layer();
                ctx.draw(&Circle {
                    x,
                    y,
                    radius,
                    color: palette.stroke,
                });
            });

        frame.render_widget(disc, element);
    }
}

/// Ease-out interpolation between two radii.
#[derive(Debug, Clone, Copy)]
struct Transition {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
}

impl Transition {
    fn settled(value: f64, now: Instant, duration: Duration) -> Self {
        Self {
            from: value,
            to: value,
            started: now,
            duration,
        }
    }

    fn value_at(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        let t = (elapsed / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * ease_out(t)
    }

    /// Starts a new transition from wherever the old one currently is.
    fn retarget(&mut self, to: f64, now: Instant) {
        if to == self.to {
            return;
        }
        self.from = self.value_at(now);
        self.to = to;
        self.started = now;
    }
}

fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::render::testing::{count_fg, render_params, render_to_buffer};

    #[test]
    fn test_first_frame_is_not_eased() {
        let mut renderer = ElementRenderer::new(Duration::from_millis(100));
        let now = Instant::now();
        assert_eq!(renderer.displayed_radius(42.0, now), 42.0);
    }

    #[test]
    fn test_transition_reaches_target_after_duration() {
        let mut renderer = ElementRenderer::new(Duration::from_millis(100));
        let start = Instant::now();
        renderer.displayed_radius(10.0, start);

        let midway = renderer.displayed_radius(20.0, start + Duration::from_millis(50));
        assert_eq!(midway, 10.0);

        let later = renderer.displayed_radius(20.0, start + Duration::from_millis(100));
        assert!(later > 10.0 && later < 20.0);

        let done = renderer.displayed_radius(20.0, start + Duration::from_millis(150));
        assert_eq!(done, 20.0);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let mut renderer = ElementRenderer::new(Duration::ZERO);
        let now = Instant::now();
        renderer.displayed_radius(10.0, now);
        assert_eq!(renderer.displayed_radius(30.0, now), 30.0);
    }

    #[test]
    fn test_ease_out_endpoints() {
        assert_eq!(ease_out(0.0), 0.0);
        assert_eq!(ease_out(1.0), 1.0);
        assert!(ease_out(0.5) > 0.5);
    }

    #[test]
    fn test_disc_is_centered_on_background() {
        let mut renderer = ElementRenderer::new(Duration::from_millis(100));
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
    fn test_oversized_disc_fills_the_screen() {
        let mut renderer = ElementRenderer::new(Duration::ZERO);
        let (_, mut params) = render_to_buffer(&mut renderer, 80, 24, 0, Instant::now());
        params.current_radius = 1.0e9;

        let buffer = render_params(&mut renderer, 80, 24, &params);

        assert_eq!(buffer.cell((40, 12)).unwrap().fg, params.palette.fill);
    }
}
