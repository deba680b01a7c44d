//! Debug log pane: a summary of page requests followed by the tracing
//! output captured while the TUI is running.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::log_capture::LogBuffer;
use crate::query::QueryKey;

/// History kept for display, independent of the capture buffer's capacity.
const MAX_HISTORY: usize = 1000;

/// Height of the pane when visible, including borders.
pub const PANE_HEIGHT: u16 = 8;

/// How a page request ended, from the view's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Loaded { count: usize },
    Failed(String),
    /// Answered after the user had moved to another page.
    Superseded,
}

/// Per-outcome totals plus the most recent request.
#[derive(Debug, Default)]
pub struct RequestStats {
    pub loaded: u64,
    pub failed: u64,
    pub superseded: u64,
    pub last: Option<(QueryKey, RequestOutcome)>,
}

impl RequestStats {
    fn record(&mut self, key: QueryKey, outcome: RequestOutcome) {
        match outcome {
            RequestOutcome::Loaded { .. } => self.loaded += 1,
            RequestOutcome::Failed(_) => self.failed += 1,
            RequestOutcome::Superseded => self.superseded += 1,
        }
        self.last = Some((key, outcome));
    }

    /// One-line summary, e.g. `page 2 (5/page): 5 messages | ok 3  failed 1  stale 0`.
    fn summary(&self) -> String {
        let last = match &self.last {
            None => "no requests yet".to_string(),
            Some((key, outcome)) => {
                let what = match outcome {
                    RequestOutcome::Loaded { count } => format!("{} messages", count),
                    RequestOutcome::Failed(reason) => format!("failed: {}", reason),
                    RequestOutcome::Superseded => "superseded".to_string(),
                };
                format!("page {} ({}/page): {}", key.page, key.per_page, what)
            }
        };
        format!(
            "{} | ok {}  failed {}  stale {}",
            last, self.loaded, self.failed, self.superseded
        )
    }
}

pub struct DebugLogState {
    source: LogBuffer,
    history: Vec<String>,
    requests: RequestStats,
    pub visible: bool,
    /// Lines scrolled back from the newest entry (0 = following the tail).
    scroll_back: usize,
}

impl DebugLogState {
    pub fn new(source: LogBuffer) -> Self {
        Self {
            source,
            history: Vec::new(),
            requests: RequestStats::default(),
            visible: false,
            scroll_back: 0,
        }
    }

    /// Move newly captured lines into the history. Called every tick.
    pub fn refresh(&mut self) {
        let fresh = self.source.drain();
        if fresh.is_empty() {
            return;
        }
        self.history.extend(fresh);
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
        self.scroll_back = self.scroll_back.min(self.history.len().saturating_sub(1));
    }

    /// Count a finished page request.
    pub fn record_request(&mut self, key: QueryKey, outcome: RequestOutcome) {
        self.requests.record(key, outcome);
    }

    #[cfg(test)]
    pub fn requests(&self) -> &RequestStats {
        &self.requests
    }

    /// Show or hide the pane. Opening it jumps back to the newest lines.
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if self.visible {
            self.scroll_back = 0;
        }
    }

    pub fn scroll_up(&mut self, n: usize) {
        let max = self.history.len().saturating_sub(1);
        self.scroll_back = (self.scroll_back + n).min(max);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(n);
    }
}

pub fn render(area: Rect, buf: &mut Buffer, state: &DebugLogState) {
    let dropped = state.source.dropped();
    let title = if dropped > 0 {
        format!(" Debug Log ({} dropped) ", dropped)
    } else {
        " Debug Log ".to_string()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    // First row is the request summary, the rest is the log tail.
    let summary_area = Rect::new(inner.x, inner.y, inner.width, 1);
    Paragraph::new(Line::from(Span::styled(
        state.requests.summary(),
        Style::default().fg(Color::Cyan),
    )))
    .render(summary_area, buf);

    let log_area = Rect::new(inner.x, inner.y + 1, inner.width, inner.height - 1);
    if log_area.height == 0 {
        return;
    }

    let end = state.history.len().saturating_sub(state.scroll_back);
    let start = end.saturating_sub(log_area.height as usize);

    let lines: Vec<Line> = state.history[start..end]
        .iter()
        .map(|l| level_colored(l))
        .collect();
    Paragraph::new(lines).render(log_area, buf);
}

/// Color a fmt-layer line by its level.
fn level_colored(line: &str) -> Line<'static> {
    let color = [
        ("ERROR", Color::Red),
        ("WARN", Color::Yellow),
        ("INFO", Color::Green),
        ("DEBUG", Color::DarkGray),
        ("TRACE", Color::DarkGray),
    ]
    .iter()
    .find(|(level, _)| line.split_whitespace().take(3).any(|w| w == *level))
    .map(|(_, c)| *c)
    .unwrap_or(Color::White);

    Line::from(Span::styled(line.to_owned(), Style::default().fg(color)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: usize) -> DebugLogState {
        let buffer = LogBuffer::new();
        for i in 0..n {
            buffer.push(format!("line {}", i));
        }
        let mut state = DebugLogState::new(buffer);
        state.refresh();
        state
    }

    #[test]
    fn test_refresh_accumulates() {
        let buffer = LogBuffer::new();
        let mut state = DebugLogState::new(buffer.clone());
        buffer.push("a".to_string());
        state.refresh();
        buffer.push("b".to_string());
        state.refresh();
        assert_eq!(state.history, vec!["a", "b"]);
    }

    #[test]
    fn test_toggle_resets_scroll() {
        let mut state = filled(10);
        state.visible = true;
        state.scroll_up(4);
        state.toggle();
        assert!(!state.visible);
        state.toggle();
        assert!(state.visible);
        assert_eq!(state.scroll_back, 0);
    }

    #[test]
    fn test_scroll_clamps() {
        let mut state = filled(5);
        state.scroll_up(100);
        assert_eq!(state.scroll_back, 4);
        state.scroll_down(100);
        assert_eq!(state.scroll_back, 0);
    }

    #[test]
    fn test_request_summary() {
        let mut state = filled(0);
        assert_eq!(
            state.requests().summary(),
            "no requests yet | ok 0  failed 0  stale 0"
        );

        state.record_request(QueryKey::new(1, 5), RequestOutcome::Loaded { count: 5 });
        state.record_request(QueryKey::new(2, 5), RequestOutcome::Superseded);
        state.record_request(
            QueryKey::new(3, 5),
            RequestOutcome::Failed("HTTP 500".to_string()),
        );

        let stats = state.requests();
        assert_eq!((stats.loaded, stats.failed, stats.superseded), (1, 1, 1));
        assert_eq!(
            stats.summary(),
            "page 3 (5/page): failed: HTTP 500 | ok 1  failed 1  stale 1"
        );
    }

    #[test]
    fn test_render_shows_summary_above_log() {
        let mut state = filled(3);
        state.record_request(QueryKey::new(2, 5), RequestOutcome::Loaded { count: 4 });

        let area = Rect::new(0, 0, 70, 5);
        let mut buf = Buffer::empty(area);
        render(area, &mut buf, &state);
        let rows: Vec<String> = buf
            .content()
            .chunks(70)
            .map(|row| row.iter().map(|c| c.symbol()).collect())
            .collect();

        assert!(rows[1].contains("page 2 (5/page): 4 messages"));
        // Two log rows fit under the summary; the newest lines win.
        assert!(rows[2].contains("line 1"));
        assert!(rows[3].contains("line 2"));
    }

    #[test]
    fn test_level_colors() {
        let line = level_colored("2024-01-01T00:00:00Z  WARN HTTP 500 for /messages");
        assert_eq!(line.spans[0].style.fg, Some(Color::Yellow));
        let line = level_colored("no level here");
        assert_eq!(line.spans[0].style.fg, Some(Color::White));
    }
}
