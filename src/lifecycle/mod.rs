//! Per-mount setup, frame loop and teardown.
//!
//! A [`LifecycleController`] owns everything one running visualizer needs:
//! the capture session, the analyzer and the pending frame. It moves through
//! `Idle → Acquiring → Capturing → Rendering → Stopped`, or
//! `Acquiring → Failed` when the microphone cannot be opened.

pub mod frame_loop;

use std::time::{Duration, Instant};

use ratatui::{style::Style, widgets::Block, Frame};

use crate::analysis::{self, AnalyzerOptions, SpectrumAnalyzer, FFT_SIZE};
use crate::capture::{CaptureError, CaptureManager, CaptureSession, InputBackend};
use crate::ui::fallback::render_fallback;
use crate::visual::{
    FrameRenderer, Palette, RadiusMapper, RenderParams, RendererKind, Theme, ViewportSize,
};

pub use frame_loop::FrameLoop;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Acquiring,
    Capturing,
    Rendering,
    Stopped,
    Failed,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Acquiring => "acquiring",
            Self::Capturing => "capturing",
            Self::Rendering => "rendering",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tuning shared by every mount of a controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerOptions {
    pub analyzer: AnalyzerOptions,
    pub mapper: RadiusMapper,
    /// Re-acquire the microphone when the viewport changes size
    pub restart_on_resize: bool,
    /// Easing time for the element renderer
    pub transition: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerOptions::default(),
            mapper: RadiusMapper::default(),
            restart_on_resize: true,
            transition: Duration::from_millis(100),
        }
    }
}

/// Resources held while capturing.
struct Mount {
    session: CaptureSession,
    analyzer: SpectrumAnalyzer,
    frames: FrameLoop,
}

/// Drives capture → analysis → radius → render for one visualizer.
pub struct LifecycleController<B: InputBackend> {
    capture: CaptureManager<B>,
    options: ControllerOptions,
    renderer: Box<dyn FrameRenderer>,
    theme: Theme,
    palette: Palette,
    viewport: ViewportSize,
    state: LifecycleState,
    mount: Option<Mount>,
    last_params: Option<RenderParams>,
    last_error: Option<CaptureError>,
    frames_scheduled: u64,
}

impl<B: InputBackend> LifecycleController<B> {
    pub fn new(
        backend: B,
        options: ControllerOptions,
        renderer: RendererKind,
        theme: Theme,
        viewport: ViewportSize,
    ) -> Self {
        Self {
            capture: CaptureManager::new(backend, FFT_SIZE),
            options,
            renderer: renderer.build(options.transition),
            palette: theme.palette(),
            theme,
            viewport,
            state: LifecycleState::Idle,
            mount: None,
            last_params: None,
            last_error: None,
            frames_scheduled: 0,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the microphone is live and frames are being produced.
    pub fn is_capturing(&self) -> bool {
        self.state == LifecycleState::Rendering
    }

    /// Why the last activation failed, if it did.
    pub fn last_error(&self) -> Option<&CaptureError> {
        self.last_error.as_ref()
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    #[cfg(test)]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn renderer_kind(&self) -> RendererKind {
        self.renderer.kind()
    }

    /// The frame waiting to run, if any.
    #[cfg(test)]
    pub fn pending_frame(&self) -> Option<frame_loop::LoopHandle> {
        self.mount.as_ref().and_then(|mount| mount.frames.pending())
    }

    /// Frames scheduled across all mounts of this controller.
    #[cfg(test)]
    pub fn frames_scheduled(&self) -> u64 {
        self.frames_scheduled
    }

    #[cfg(test)]
    pub fn capture(&self) -> &CaptureManager<B> {
        &self.capture
    }

    /// Starts capture and schedules the first frame.
    ///
    /// Any existing mount is torn down first. Failures are logged and leave
    /// the controller in `Failed` with nothing scheduled.
    pub fn activate(&mut self, viewport: ViewportSize) {
        if self.mount.is_some() {
            self.teardown();
        }
        self.viewport = viewport;
        self.last_error = None;

        self.enter(LifecycleState::Acquiring);
        let session = match self.capture.acquire() {
            Ok(session) => session,
            Err(err) => {
                tracing::error!("Error accessing microphone: {}", err);
                self.last_error = Some(err);
                self.enter(LifecycleState::Failed);
                return;
            }
        };

        self.enter(LifecycleState::Capturing);
        let analyzer = SpectrumAnalyzer::create(&session, self.options.analyzer);
        tracing::info!(
            "Visualizing '{}' at {}Hz with the {} renderer",
            session.device_name(),
            session.sample_rate(),
            self.renderer.kind()
        );
        tracing::debug!(
            "Analyzer: fft size {}, {} bins",
            analyzer.fft_size(),
            analyzer.frequency_bin_count()
        );

        let mut frames = FrameLoop::new();
        if frames.schedule().is_some() {
            self.frames_scheduled += 1;
        }
        self.mount = Some(Mount {
            session,
            analyzer,
            frames,
        });
        self.enter(LifecycleState::Rendering);
    }

    /// Draws the current state into `frame`.
    ///
    /// While rendering, a due frame is sampled, mapped and drawn, then the
    /// next frame is scheduled. A failed controller shows the fallback
    /// message; any other state only clears to the background.
    pub fn render_frame(&mut self, frame: &mut Frame, now: Instant) {
        let area = frame.area();
        match self.state {
            LifecycleState::Rendering => {
                if let Some(params) = self.begin_frame(now) {
                    self.renderer.render(frame, area, &params);
                    self.last_params = Some(params);
                    self.schedule_next();
                } else if let Some(params) = &self.last_params {
                    self.renderer.render(frame, area, params);
                }
            }
            LifecycleState::Failed => render_fallback(frame, area, &self.palette),
            _ => frame.render_widget(
                Block::default().style(Style::default().bg(self.palette.background)),
                area,
            ),
        }
    }

    /// Samples the analyzer and computes this frame's parameters, if a frame is due.
    fn begin_frame(&mut self, now: Instant) -> Option<RenderParams> {
        if self.state != LifecycleState::Rendering {
            return None;
        }
        let mount = self.mount.as_mut()?;
        mount.frames.take_due()?;

        mount.analyzer.sample();
        let amplitude = analysis::reduce(mount.analyzer.buffer());

        Some(RenderParams {
            viewport: self.viewport,
            base_radius: self.options.mapper.base_radius(self.viewport),
            current_radius: self.options.mapper.map_radius(amplitude, self.viewport),
            palette: self.palette,
            timestamp: now,
        })
    }

    fn schedule_next(&mut self) {
        if let Some(mount) = self.mount.as_mut() {
            if mount.frames.schedule().is_some() {
                self.frames_scheduled += 1;
            }
        }
    }

    /// Runs one frame without a display surface.
    #[cfg(test)]
    pub fn advance(&mut self, now: Instant) -> Option<RenderParams> {
        let params = self.begin_frame(now)?;
        self.last_params = Some(params);
        self.schedule_next();
        Some(params)
    }

    /// Applies a new viewport size.
    ///
    /// While rendering with `restart_on_resize`, this is one full teardown
    /// followed by one activation. Otherwise only the radius bounds change.
    pub fn resize(&mut self, viewport: ViewportSize) {
        if viewport == self.viewport {
            return;
        }
        tracing::debug!(
            "Viewport resized from {}x{} to {}x{}",
            self.viewport.width,
            self.viewport.height,
            viewport.width,
            viewport.height
        );
        self.viewport = viewport;

        if self.state == LifecycleState::Rendering && self.options.restart_on_resize {
            tracing::info!("Restarting capture after resize");
            self.teardown();
            self.activate(viewport);
        }
    }

    /// Swaps the colors. Capture keeps running.
    pub fn set_theme(&mut self, theme: Theme) {
        if theme == self.theme {
            return;
        }
        self.theme = theme;
        self.palette = theme.palette();
        if let Some(params) = self.last_params.as_mut() {
            params.palette = self.palette;
        }
        tracing::info!("Theme updated");
    }

    /// Swaps the rendering strategy. Capture keeps running.
    pub fn set_renderer(&mut self, kind: RendererKind) {
        if kind == self.renderer.kind() {
            return;
        }
        self.renderer = kind.build(self.options.transition);
        tracing::info!("Renderer switched to {}", kind);
    }

    /// Cancels the pending frame, disconnects the analyzer and releases the
    /// microphone. Calling it again does nothing.
    pub fn teardown(&mut self) {
        self.last_params = None;
        let Some(mut mount) = self.mount.take() else {
            return;
        };
        self.enter(LifecycleState::Stopped);

        mount.frames.cancel();
        mount.analyzer.disconnect();
        self.capture.release(&mut mount.session);
        tracing::debug!("Stopped after {} frames in total", self.frames_scheduled);
    }

    fn enter(&mut self, state: LifecycleState) {
        if self.state != state {
            tracing::debug!("Lifecycle {} -> {}", self.state, state);
            self.state = state;
        }
    }
}

impl<B: InputBackend> Drop for LifecycleController<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
