//! UI rendering for the TUI

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::App;
use super::debug_log;
use super::help;
use super::messages::{self, FetchState};

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    // Layout: header (1 line) + main content + status bar (1 line)
    let [header_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(header_area, frame.buffer_mut(), app);

    if app.debug_log.visible {
        let [messages_area, log_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(debug_log::PANE_HEIGHT),
        ])
        .areas(main_area);
        messages::render(messages_area, frame.buffer_mut(), &app.messages, true);
        debug_log::render(log_area, frame.buffer_mut(), &app.debug_log);
    } else {
        messages::render(main_area, frame.buffer_mut(), &app.messages, true);
    }

    render_status(status_area, frame.buffer_mut(), app);

    if app.show_help {
        help::render_help_popup(frame);
    }
}

/// Title on the left, API endpoint on the right.
fn render_header(area: Rect, buf: &mut Buffer, app: &App) {
    let title = " msgboard";
    let right = format!("[?] Help  {} ", app.api_url);
    let padding = (area.width as usize).saturating_sub(title.width() + right.width());

    let line = Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, Style::default().fg(Color::Cyan)),
    ]);

    Paragraph::new(line)
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}

fn render_status(area: Rect, buf: &mut Buffer, app: &App) {
    let (state_text, state_color) = match &app.messages.fetch {
        FetchState::Idle => ("idle".to_string(), Color::Gray),
        FetchState::Loading => ("loading".to_string(), Color::Yellow),
        FetchState::Success(page) => (format!("{} messages", page.total), Color::Green),
        FetchState::Error(_) => ("error".to_string(), Color::Red),
    };

    let sep_style = Style::default().fg(Color::Gray);
    let hint_style = Style::default().fg(Color::Gray);

    let line = Line::from(vec![
        Span::styled(format!(" * {} ", state_text), Style::default().fg(state_color)),
        Span::styled(" | ", sep_style),
        Span::styled(app.messages.page_info(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", sep_style),
        Span::styled("</>: page", hint_style),
        Span::styled(" | ", sep_style),
        Span::styled("r: reload", hint_style),
        Span::styled(" | ", sep_style),
        Span::styled("q: quit", hint_style),
    ]);

    Paragraph::new(line)
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}
