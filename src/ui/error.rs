//! Full-screen error display used before the visualizer can start.

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::*,
    widgets::{Block, Paragraph, Wrap},
};
use std::io::Stdout;
use std::time::Duration;

use super::terminal::{enter_screen, open_terminal};

const ERROR_BACKGROUND: Color = Color::Rgb(255, 0, 0);
const ERROR_TEXT: Color = Color::Rgb(255, 255, 255);

/// Red screen with a centered message, dismissed by any key.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl ErrorScreen {
    /// Enters raw mode and the alternate screen.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new() -> anyhow::Result<Self> {
        let terminal = enter_screen(enable_raw_mode, open_terminal, disable_raw_mode)?;
        Ok(ErrorScreen {
            terminal,
            active: true,
        })
    }

    /// Shows `message` until a key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering or event polling fails
    pub fn show_error(&mut self, message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                render_error(frame, area, message);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Restores the terminal. Calling it twice does nothing.
    ///
    /// # Errors
    /// - If raw mode cannot be disabled or the alternate screen left
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

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Draws the message centered on a red background, wrapped to 80% width.
pub fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let style = Style::default().fg(ERROR_TEXT).bg(ERROR_BACKGROUND);
    frame.render_widget(Block::default().style(style), area);

    let text_width = area.width.saturating_mul(4) / 5;
    let lines = message.lines().count().max(1) as u16;
    let [column] = Layout::horizontal([Constraint::Length(text_width)])
        .flex(Flex::Center)
        .areas(area);
    let [text_area] = Layout::vertical([Constraint::Length(lines.saturating_add(2))])
        .flex(Flex::Center)
        .areas(column);

    let paragraph = Paragraph::new(message)
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, text_area);
}
