//! Message shown in place of the circle when the microphone is unavailable.

use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Paragraph, Wrap},
    Frame,
};

use crate::visual::Palette;

pub const FALLBACK_TITLE: &str = "Microphone access is required for the visualizer.";
pub const FALLBACK_HINT: &str = "Please allow microphone access and press Enter to try again.";

/// Clears the area and centers the two-line instruction.
pub fn render_fallback(frame: &mut Frame, area: Rect, palette: &Palette) {
    let style = Style::default().fg(palette.text).bg(palette.background);
    frame.render_widget(Block::default().style(style), area);

    let text = Text::from(vec![
        Line::styled(FALLBACK_TITLE, Style::default().add_modifier(Modifier::BOLD)),
        Line::raw(FALLBACK_HINT),
    ]);

    // Room for both lines to wrap once on narrow terminals.
    let [message] = Layout::vertical([Constraint::Length(4)])
        .flex(Flex::Center)
        .areas(area);

    frame.render_widget(
        Paragraph::new(text)
            .style(style)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        message,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::Theme;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_fallback_shows_both_lines() {
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        let palette = Theme::default().palette();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_fallback(frame, area, &palette);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let rows: Vec<String> = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
                    .collect()
            })
            .collect();

        assert!(rows.iter().any(|row| row.contains(FALLBACK_TITLE)));
        assert!(rows.iter().any(|row| row.contains(FALLBACK_HINT)));
        assert_eq!(buffer.cell((0, 0)).unwrap().bg, palette.background);
    }
}
