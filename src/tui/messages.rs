//! Messages pane: one page of messages with Previous/Next pagination.
//!
//! The pane owns the current page number. Every page change goes through
//! [`MessagesState::activate`], which shows cached data (or a loading
//! placeholder) and returns the key to fetch, if any. Results come back
//! through [`MessagesState::apply`] and are only displayed when their key
//! is still the current one.

use std::cell::Cell;
use std::time::Duration;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::api::ApiError;
use crate::models::{Message, PageResult};
use crate::query::{QueryCache, QueryKey};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle of the request for the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Success(PageResult),
    Error(String),
}

pub struct MessagesState {
    /// Current page number (1-based).
    page: u32,
    per_page: u32,
    /// `total_pages` from the most recent successful response.
    last_total_pages: Option<u32>,
    pub fetch: FetchState,
    cache: QueryCache<PageResult>,
    /// Index of the highlighted message on the current page.
    pub selected: usize,
    /// Vertical scroll offset in rendered lines, updated on every draw.
    scroll_offset: Cell<usize>,
}

impl MessagesState {
    pub fn new(per_page: u32, cache_gc_time: Duration) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            last_total_pages: None,
            fetch: FetchState::Idle,
            cache: QueryCache::new(cache_gc_time),
            selected: 0,
            scroll_offset: Cell::new(0),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    #[cfg(test)]
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset.get()
    }

    pub fn current_key(&self) -> QueryKey {
        QueryKey::new(self.page, self.per_page)
    }

    /// Total pages shown in the footer; 1 until a page has loaded.
    pub fn total_pages(&self) -> u32 {
        self.last_total_pages.unwrap_or(1)
    }

    /// "Page {current} of {total}"
    pub fn page_info(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages())
    }

    pub fn can_go_previous(&self) -> bool {
        self.page > 1
    }

    /// Next is only possible once a response has told us there is more.
    pub fn can_go_next(&self) -> bool {
        self.last_total_pages.is_some_and(|total| self.page < total)
    }

    /// Messages currently on screen (empty unless the fetch succeeded).
    pub fn messages(&self) -> &[Message] {
        match &self.fetch {
            FetchState::Success(result) => &result.messages,
            _ => &[],
        }
    }

    /// Initial load.
    pub fn mount(&mut self) -> Option<QueryKey> {
        self.activate()
    }

    pub fn previous_page(&mut self) -> Option<QueryKey> {
        if !self.can_go_previous() {
            return None;
        }
        self.page -= 1;
        self.reset_cursor();
        self.activate()
    }

    pub fn next_page(&mut self) -> Option<QueryKey> {
        if !self.can_go_next() {
            return None;
        }
        self.page += 1;
        self.reset_cursor();
        self.activate()
    }

    /// Refetch the current page, keeping what is on screen meanwhile.
    pub fn refresh(&mut self) -> Option<QueryKey> {
        let key = self.current_key();
        if matches!(self.fetch, FetchState::Error(_) | FetchState::Idle) {
            self.fetch = FetchState::Loading;
        }
        self.cache.begin(key).then_some(key)
    }

    /// Show whatever we know about the current page and request it.
    fn activate(&mut self) -> Option<QueryKey> {
        let key = self.current_key();
        self.fetch = match self.cache.get(&key) {
            Some(cached) => FetchState::Success(cached.clone()),
            None => FetchState::Loading,
        };
        self.cache.begin(key).then_some(key)
    }

    /// Apply a finished request. Returns a follow-up fetch if the current
    /// page turned out to be past the end of the collection.
    pub fn apply(&mut self, key: QueryKey, result: Result<PageResult, ApiError>) -> Option<QueryKey> {
        let current = key == self.current_key();

        match result {
            Ok(page) => {
                self.cache.complete(key, page.clone());
                if !current {
                    tracing::debug!("Ignoring superseded result for page {}", key.page);
                    return None;
                }

                self.last_total_pages = Some(page.total_pages);
                if self.page > page.total_pages {
                    // Collection shrank under us.
                    tracing::info!(
                        "Page {} no longer exists, moving to page {}",
                        self.page,
                        page.total_pages
                    );
                    self.page = page.total_pages;
                    self.reset_cursor();
                    return self.activate();
                }

                self.keep_selection(&page);
                self.fetch = FetchState::Success(page);
                None
            }
            Err(e) => {
                self.cache.fail(key);
                if !current {
                    tracing::debug!("Ignoring superseded error for page {}: {}", key.page, e);
                    return None;
                }
                tracing::warn!(status = ?e.status(), "Loading page {} failed: {}", key.page, e);
                self.fetch = FetchState::Error(e.to_string());
                self.reset_cursor();
                None
            }
        }
    }

    /// The backend could not start at all. Nothing in flight will answer.
    pub fn fail_all(&mut self, reason: &str) {
        self.cache.abort_all();
        self.fetch = FetchState::Error(reason.to_string());
        self.reset_cursor();
    }

    /// A request for `key` was never delivered to the backend.
    pub fn abandon(&mut self, key: QueryKey, reason: &str) {
        self.cache.abort(key);
        if key == self.current_key() {
            self.fetch = FetchState::Error(reason.to_string());
            self.reset_cursor();
        }
    }

    /// Drop stale cached pages.
    pub fn collect_garbage(&mut self) {
        let evicted = self.cache.gc(Some(self.current_key()));
        if evicted > 0 {
            tracing::debug!(
                "Evicted {} cached pages ({} remain)",
                evicted,
                self.cache.len()
            );
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.messages().len() {
            self.selected += 1;
        }
    }

    fn reset_cursor(&mut self) {
        self.selected = 0;
        self.scroll_offset.set(0);
    }

    /// Keep the highlighted message (by id) across a refetch of the same page.
    fn keep_selection(&mut self, incoming: &PageResult) {
        let selected_id = self.messages().get(self.selected).map(|m| m.id.clone());
        self.selected = selected_id
            .and_then(|id| incoming.messages.iter().position(|m| m.id == id))
            .unwrap_or(0)
            .min(incoming.messages.len().saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Rows produced for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRows {
    pub id: String,
    pub start: usize,
    pub end: usize,
}

/// Render the messages pane into the given area.
pub fn render(area: Rect, buf: &mut Buffer, state: &MessagesState, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if focused {
            BorderType::Double
        } else {
            BorderType::Plain
        })
        .border_style(border_style)
        .title(Span::styled(
            " Messages ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height < 2 || inner.width == 0 {
        return;
    }

    // Last line is the pagination footer.
    let body_area = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
    let footer_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);

    match &state.fetch {
        FetchState::Idle | FetchState::Loading => {
            render_placeholder(body_area, buf, "Loading messages...", Color::Gray);
        }
        FetchState::Error(reason) => {
            render_placeholder(
                body_area,
                buf,
                &format!("Error loading messages: {}", reason),
                Color::Red,
            );
        }
        FetchState::Success(result) if result.messages.is_empty() => {
            render_placeholder(body_area, buf, "No messages yet.", Color::Gray);
        }
        FetchState::Success(result) => {
            render_list(body_area, buf, state, &result.messages);
        }
    }

    render_pagination(footer_area, buf, state);
}

fn render_placeholder(area: Rect, buf: &mut Buffer, text: &str, color: Color) {
    let lines: Vec<Line> = wrap_text(text, area.width.saturating_sub(2) as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(format!(" {}", l), Style::default().fg(color))))
        .collect();
    Paragraph::new(lines).render(area, buf);
}

fn render_list(area: Rect, buf: &mut Buffer, state: &MessagesState, messages: &[Message]) {
    if area.height == 0 {
        return;
    }

    let (all_lines, rows) = build_message_lines(messages, state.selected, area.width as usize);
    let total_lines = all_lines.len();
    let visible_height = area.height as usize;

    let scroll = compute_auto_scroll(
        state.scroll_offset.get(),
        state.selected,
        &rows,
        visible_height,
        total_lines,
    );
    state.scroll_offset.set(scroll);

    let visible: Vec<Line> = all_lines
        .into_iter()
        .skip(scroll)
        .take(visible_height)
        .collect();
    Paragraph::new(visible).render(area, buf);

    if total_lines > visible_height {
        let x = area.x + area.width.saturating_sub(1);
        if scroll > 0 {
            let cell = &mut buf[(x, area.y)];
            cell.set_char('^');
            cell.set_style(Style::default().fg(Color::DarkGray));
        }
        if scroll + visible_height < total_lines {
            let cell = &mut buf[(x, area.y + area.height - 1)];
            cell.set_char('v');
            cell.set_style(Style::default().fg(Color::DarkGray));
        }
    }
}

/// `[< Previous]   Page 1 of 2   [Next >]`, with disabled buttons dimmed.
fn render_pagination(area: Rect, buf: &mut Buffer, state: &MessagesState) {
    let button = |label: &'static str, enabled: bool| {
        let style = if enabled {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(label, style)
    };

    let prev = button("[< Previous]", state.can_go_previous());
    let next = button("[Next >]", state.can_go_next());
    let info = state.page_info();

    let used = prev.width() + next.width() + info.width();
    let gap = (area.width as usize).saturating_sub(used) / 2;

    let line = Line::from(vec![
        prev,
        Span::raw(" ".repeat(gap)),
        Span::styled(info, Style::default().fg(Color::White)),
        Span::raw(" ".repeat(gap)),
        next,
    ]);
    Paragraph::new(line)
        .style(Style::default().bg(Color::Black))
        .render(area, buf);
}

/// Build the flat line buffer and per-message row ranges in a single pass.
pub fn build_message_lines(
    messages: &[Message],
    selected: usize,
    width: usize,
) -> (Vec<Line<'static>>, Vec<MessageRows>) {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut rows = Vec::with_capacity(messages.len());

    for (idx, msg) in messages.iter().enumerate() {
        let start = lines.len();
        push_message(&mut lines, msg, width, idx == selected);
        lines.push(Line::from(""));
        rows.push(MessageRows {
            id: msg.id.clone(),
            start,
            end: lines.len(),
        });
    }

    (lines, rows)
}

/// Header line (author + timestamp) followed by wrapped content.
fn push_message(lines: &mut Vec<Line<'static>>, msg: &Message, width: usize, is_selected: bool) {
    let marker = if is_selected { "> " } else { "  " };
    let marker_style = Style::default().fg(Color::Yellow);
    let author_style = if is_selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    };

    let time = msg.formatted_time();
    let pad = width
        .saturating_sub(marker.len())
        .saturating_sub(msg.author.width())
        .saturating_sub(time.len())
        .saturating_sub(1)
        .max(1);

    lines.push(Line::from(vec![
        Span::styled(marker.to_string(), marker_style),
        Span::styled(msg.author.clone(), author_style),
        Span::raw(" ".repeat(pad)),
        Span::styled(time, Style::default().fg(Color::DarkGray)),
    ]));

    let content_width = width.saturating_sub(4);
    for l in wrap_text(&msg.content, content_width) {
        lines.push(Line::from(vec![Span::raw("    "), Span::raw(l)]));
    }
}

/// Simple word-wrapping: split content by newlines first, then wrap long lines.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![];
    }
    let mut result = Vec::new();
    for line in text.lines() {
        if line.width() <= max_width {
            result.push(line.to_string());
            continue;
        }
        let mut current = String::new();
        for word in line.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.width() + 1 + word.width() <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                result.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            result.push(current);
        }
    }
    result
}

/// Scroll offset that keeps the selected message visible.
fn compute_auto_scroll(
    current_scroll: usize,
    selected: usize,
    rows: &[MessageRows],
    visible_height: usize,
    total_lines: usize,
) -> usize {
    if total_lines <= visible_height {
        return 0;
    }
    let Some(sel) = rows.get(selected) else {
        return current_scroll;
    };

    let mut scroll = current_scroll;
    if sel.end - sel.start >= visible_height || sel.start < scroll {
        scroll = sel.start;
    } else if sel.end > scroll + visible_height {
        scroll = sel.end - visible_height;
    }

    scroll.min(total_lines - visible_height)
}
