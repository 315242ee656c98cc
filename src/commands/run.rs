//! The microphone visualizer.
//!
//! Owns the terminal, drives the frame clock and routes key presses, resize
//! events and theme reloads (SIGUSR1) into the lifecycle controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tokio::time::MissedTickBehavior;

use crate::capture::{CpalBackend, InputBackend};
use crate::config::MicpulseConfig;
use crate::lifecycle::{LifecycleController, LifecycleState};
use crate::ui::{ErrorScreen, PulseTui, UserCommand};
use crate::visual::theme::Rgba;
use crate::visual::{RendererKind, ViewportSize};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub renderer: Option<RendererKind>,
    pub device: Option<String>,
    pub stroke_color: Option<String>,
    pub inner_color: Option<String>,
    pub background_color: Option<String>,
}

impl RunOverrides {
    /// Writes the overrides into `config`.
    ///
    /// # Errors
    /// - If an override color is not valid hex notation
    pub fn apply(&self, config: &mut MicpulseConfig) -> anyhow::Result<()> {
        if let Some(renderer) = self.renderer {
            config.visual.renderer = renderer;
        }
        if let Some(device) = &self.device {
            config.audio.device = device.clone();
        }

        let colors = [
            (&self.stroke_color, &mut config.theme.stroke_color),
            (&self.inner_color, &mut config.theme.inner_color),
            (&self.background_color, &mut config.theme.background_color),
        ];
        for (value, target) in colors {
            if let Some(value) = value {
                value.parse::<Rgba>()?;
                *target = value.clone();
            }
        }
        Ok(())
    }
}

/// Runs the visualizer until the user quits.
///
/// # Errors
/// - If the configuration cannot be loaded (after showing it on screen)
/// - If an override color is invalid
/// - If the terminal cannot be initialized or drawn to
pub async fn handle_run(overrides: RunOverrides) -> anyhow::Result<()> {
    tracing::info!("=== micpulse started ===");

    let mut config = match MicpulseConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/micpulse/micpulse.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };
    overrides.apply(&mut config)?;

    tracing::info!(
        "Configuration loaded: device={}, renderer={}, frame_rate={}",
        config.audio.device,
        config.visual.renderer,
        config.visual.frame_rate
    );

    let backend = CpalBackend::new(config.audio.device.clone());
    let mut tui = PulseTui::new()?;
    let viewport = tui.viewport()?;
    let mut controller = LifecycleController::new(
        backend,
        config.controller_options(),
        config.visual.renderer,
        config.theme.theme(),
        viewport,
    );

    let reload = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&reload))
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    controller.activate(viewport);
    report_capture(&controller);

    let result = frame_clock(
        &mut tui,
        &mut controller,
        &reload,
        &overrides,
        config.frame_interval(),
    )
    .await;

    controller.teardown();
    tui.cleanup()?;
    tracing::info!("=== micpulse stopped ===");
    result
}

/// Draws one frame per tick until `Quit` or a terminal error.
async fn frame_clock<B: InputBackend>(
    tui: &mut PulseTui,
    controller: &mut LifecycleController<B>,
    reload: &AtomicBool,
    overrides: &RunOverrides,
    period: Duration,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        if reload.swap(false, Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: reloading theme");
            reload_theme(controller, overrides);
        }

        loop {
            match tui.next_command(Duration::ZERO)? {
                UserCommand::Continue => break,
                UserCommand::Quit => return Ok(()),
                command => apply_command(controller, command),
            }
        }

        tui.draw(|frame| controller.render_frame(frame, Instant::now()))?;
    }
}

fn apply_command<B: InputBackend>(controller: &mut LifecycleController<B>, command: UserCommand) {
    match command {
        UserCommand::Retry if controller.state() == LifecycleState::Failed => {
            tracing::info!("Retrying microphone access");
            controller.activate(controller.viewport());
            report_capture(controller);
        }
        UserCommand::SwitchRenderer => {
            controller.set_renderer(controller.renderer_kind().toggled());
        }
        UserCommand::Resize(cols, rows) => {
            controller.resize(ViewportSize::from_area(Rect::new(0, 0, cols, rows)));
        }
        _ => {}
    }
}

fn report_capture<B: InputBackend>(controller: &LifecycleController<B>) {
    match controller.last_error() {
        Some(err) if !controller.is_capturing() => {
            tracing::warn!("Showing microphone fallback: {err}");
        }
        _ => tracing::debug!("Capture running"),
    }
}

/// Re-reads the theme section, keeping command-line colors on top.
fn reload_theme<B: InputBackend>(
    controller: &mut LifecycleController<B>,
    overrides: &RunOverrides,
) {
    let mut config = match MicpulseConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Theme reload skipped, config unreadable: {err}");
            return;
        }
    };
    if let Err(err) = overrides.apply(&mut config) {
        tracing::warn!("Theme reload skipped: {err}");
        return;
    }
    controller.set_theme(config.theme.theme());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::testing::FakeBackend;
    use crate::capture::CaptureError;
    use crate::lifecycle::ControllerOptions;
    use crate::visual::Theme;

    fn controller(backend: FakeBackend) -> LifecycleController<FakeBackend> {
        LifecycleController::new(
            backend,
            ControllerOptions::default(),
            RendererKind::Canvas,
            Theme::default(),
            ViewportSize::new(160.0, 96.0),
        )
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = MicpulseConfig::default();
        RunOverrides {
            renderer: Some(RendererKind::Element),
            device: Some("1".to_string()),
            background_color: Some("#000000".to_string()),
            ..RunOverrides::default()
        }
        .apply(&mut config)
        .unwrap();

        assert_eq!(config.visual.renderer, RendererKind::Element);
        assert_eq!(config.audio.device, "1");
        assert_eq!(config.theme.background_color, "#000000");
        assert_eq!(config.theme.stroke_color, MicpulseConfig::default().theme.stroke_color);
    }

    #[test]
    fn test_invalid_override_color_is_an_error() {
        let mut config = MicpulseConfig::default();
        let result = RunOverrides {
            inner_color: Some("blue".to_string()),
            ..RunOverrides::default()
        }
        .apply(&mut config);

        assert!(result.is_err());
        assert_eq!(config.theme.inner_color, MicpulseConfig::default().theme.inner_color);
    }

    #[test]
    fn test_retry_only_after_failure() {
        let backend = FakeBackend::failing(CaptureError::PermissionDenied("declined".to_string()));
        let mut controller = controller(backend.clone());
        controller.activate(controller.viewport());
        assert_eq!(controller.state(), LifecycleState::Failed);

        apply_command(&mut controller, UserCommand::Retry);
        assert_eq!(controller.state(), LifecycleState::Rendering);
        assert_eq!(backend.opens.get(), 1);

        apply_command(&mut controller, UserCommand::Retry);
        assert_eq!(backend.opens.get(), 1);
    }

    #[test]
    fn test_switch_renderer_keeps_capture() {
        let backend = FakeBackend::default();
        let mut controller = controller(backend.clone());
        controller.activate(controller.viewport());

        apply_command(&mut controller, UserCommand::SwitchRenderer);

        assert_eq!(controller.renderer_kind(), RendererKind::Element);
        assert_eq!(backend.opens.get(), 1);
        assert_eq!(controller.state(), LifecycleState::Rendering);
    }

    #[test]
    fn test_resize_event_restarts_capture() {
        let backend = FakeBackend::default();
        let mut controller = controller(backend.clone());
        controller.activate(controller.viewport());

        apply_command(&mut controller, UserCommand::Resize(100, 30));

        assert_eq!(controller.viewport(), ViewportSize::new(200.0, 120.0));
        assert_eq!(backend.opens.get(), 2);
        assert_eq!(backend.live.get(), 1);
    }
}
