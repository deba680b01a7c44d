//! Help popup overlay listing keyboard shortcuts.

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

const POPUP_WIDTH: u16 = 46;

/// (keys, description)
const SHORTCUTS: &[(&str, &str)] = &[
    ("Left / h / p", "Previous page"),
    ("Right / l / n", "Next page"),
    ("Up / k", "Select previous message"),
    ("Down / j", "Select next message"),
    ("r", "Reload current page"),
    ("d", "Toggle debug log"),
    ("PgUp / PgDn", "Scroll debug log"),
    ("?", "Toggle this help"),
    ("q / Esc / Ctrl+C", "Quit"),
];

pub fn render_help_popup(frame: &mut Frame) {
    let height = SHORTCUTS.len() as u16 + 4;
    let area = centered(frame.area(), POPUP_WIDTH, height);

    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![Line::from("")];
    lines.extend(SHORTCUTS.iter().map(|(keys, desc)| {
        Line::from(vec![
            Span::styled(format!("  {:<18}", keys), key_style),
            Span::raw(*desc),
        ])
    }));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" Press ? or Esc to close ").centered());

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Rect of the given size centered in `area`, shrunk to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}
