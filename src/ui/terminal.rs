//! Terminal ownership and key handling for the visualizer.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{stdout, Stdout};
use std::time::Duration;

use crate::visual::ViewportSize;

/// User input between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    /// Nothing to do (no event or an unmapped key)
    Continue,
    /// Leave the visualizer (q, Escape or Ctrl+C)
    Quit,
    /// Try the microphone again (Enter)
    Retry,
    /// Swap canvas and element renderers (Tab)
    SwitchRenderer,
    /// Terminal resized to columns × rows
    Resize(u16, u16),
}

/// Raw-mode alternate screen that the visualizer draws into.
pub struct PulseTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl PulseTui {
    /// Enters raw mode and the alternate screen.
    ///
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        enter_screen(enable_raw_mode, open_terminal, disable_raw_mode).map(|terminal| PulseTui {
            terminal,
            active: true,
        })
    }

    /// Current drawable size in braille dots.
    ///
    /// # Errors
    /// - If the terminal size cannot be queried
    pub fn viewport(&self) -> anyhow::Result<ViewportSize> {
        let size = self.terminal.size()?;
        Ok(ViewportSize::from_area(Rect::new(0, 0, size.width, size.height)))
    }

    /// Draws one frame.
    ///
    /// # Errors
    /// - If writing to the terminal fails
    pub fn draw<F>(&mut self, render: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Waits up to `timeout` for the next input event.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn next_command(&mut self, timeout: Duration) -> anyhow::Result<UserCommand> {
        if !event::poll(timeout)? {
            return Ok(UserCommand::Continue);
        }
        Ok(match event::read()? {
            Event::Key(key) => command_for_key(key),
            Event::Resize(cols, rows) => UserCommand::Resize(cols, rows),
            _ => UserCommand::Continue,
        })
    }

    /// Leaves the alternate screen. Calling it twice does nothing.
    ///
    /// # Errors
    /// - If raw mode cannot be disabled
    /// - If the cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for PulseTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

pub(crate) fn open_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;
    Ok(terminal)
}

/// Enables raw mode, then opens the screen. Raw mode is switched back off
/// when opening fails.
pub(crate) fn enter_screen<T>(
    enable: impl FnOnce() -> std::io::Result<()>,
    open: impl FnOnce() -> anyhow::Result<T>,
    disable: impl FnOnce() -> std::io::Result<()>,
) -> anyhow::Result<T> {
    enable()?;
    open().inspect_err(|e| {
        tracing::error!("Failed to open terminal screen: {e}");
        let _ = disable();
    })
}

/// Maps a key press to a command. Releases and repeats are ignored.
fn command_for_key(key: KeyEvent) -> UserCommand {
    if key.kind != KeyEventKind::Press {
        return UserCommand::Continue;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            tracing::debug!("Escape or 'q' pressed: quitting");
            UserCommand::Quit
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            tracing::debug!("Ctrl+C pressed: quitting");
            UserCommand::Quit
        }
        KeyCode::Enter => UserCommand::Retry,
        KeyCode::Tab => UserCommand::SwitchRenderer,
        _ => UserCommand::Continue,
    }
}
