//! TUI application state and main event loop

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;

use super::backend::{Backend, BackendCommand, BackendResponse};
use super::debug_log::{DebugLogState, RequestOutcome};
use super::log_capture::LogBuffer;
use super::messages::MessagesState;
use super::ui;
use crate::config::Settings;
use crate::query::QueryKey;

/// Target frame rate for UI updates (~30 fps)
const FRAME_DURATION_MS: u64 = 33;

/// Ticks between cache garbage collection passes (~5s).
const GC_EVERY_TICKS: u64 = 150;

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_exit: bool,
    /// Base URL shown in the header
    pub api_url: String,
    pub messages: MessagesState,
    pub debug_log: DebugLogState,
    pub show_help: bool,
    ticks: u64,
}

impl App {
    pub fn new(settings: &Settings, logs: LogBuffer) -> Self {
        Self {
            should_exit: false,
            api_url: settings.api_url.clone(),
            messages: MessagesState::new(settings.per_page, settings.cache_gc_time),
            debug_log: DebugLogState::new(logs),
            show_help: false,
            ticks: 0,
        }
    }

    /// Initial fetch for page 1.
    pub fn mount(&mut self) -> Option<BackendCommand> {
        self.messages.mount().map(load)
    }

    /// Handle a key press, returning a fetch to issue if the page changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<BackendCommand> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_exit = true;
            return None;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_exit = true;
                None
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                None
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => {
                self.messages.previous_page().map(load)
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => {
                self.messages.next_page().map(load)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.messages.select_previous();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.messages.select_next();
                None
            }
            KeyCode::Char('r') => self.messages.refresh().map(load),
            KeyCode::Char('d') => {
                self.debug_log.toggle();
                None
            }
            KeyCode::PageUp => {
                self.debug_log.scroll_up(5);
                None
            }
            KeyCode::PageDown => {
                self.debug_log.scroll_down(5);
                None
            }
            _ => None,
        }
    }

    /// Apply a backend response.
    pub fn handle_response(&mut self, resp: BackendResponse) -> Option<BackendCommand> {
        match resp {
            BackendResponse::Page { key, result } => {
                let outcome = if key != self.messages.current_key() {
                    RequestOutcome::Superseded
                } else {
                    match &result {
                        Ok(page) => RequestOutcome::Loaded {
                            count: page.messages.len(),
                        },
                        Err(e) => RequestOutcome::Failed(e.to_string()),
                    }
                };
                self.debug_log.record_request(key, outcome);
                self.messages.apply(key, result).map(load)
            }
            BackendResponse::ClientError(reason) => {
                tracing::error!("Backend failed to start: {}", reason);
                self.messages.fail_all(&reason);
                None
            }
        }
    }

    /// The backend task is gone and `cmd` was never delivered.
    pub fn command_dropped(&mut self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::LoadPage { key } => {
                self.messages.abandon(key, "Backend is not running");
            }
        }
    }

    /// Periodic housekeeping between frames.
    pub fn on_tick(&mut self) {
        self.ticks += 1;
        self.debug_log.refresh();
        if self.ticks % GC_EVERY_TICKS == 0 {
            self.messages.collect_garbage();
        }
    }

    /// Render the UI
    pub fn render(&self, frame: &mut ratatui::Frame) {
        ui::render(frame, self);
    }
}

fn load(key: QueryKey) -> BackendCommand {
    BackendCommand::LoadPage { key }
}

/// Run the TUI until the user quits. The terminal is restored on exit and
/// on panic (ratatui installs a restoring panic hook).
pub async fn run(settings: Settings, logs: LogBuffer) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, &settings, logs).await;
    ratatui::restore();
    result
}

async fn run_app(terminal: &mut DefaultTerminal, settings: &Settings, logs: LogBuffer) -> Result<()> {
    let mut app = App::new(settings, logs);
    let mut backend = Backend::start(settings.api_url.clone());
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(FRAME_DURATION_MS));

    if let Some(cmd) = app.mount() {
        dispatch(&mut app, &backend, cmd);
    }

    while !app.should_exit {
        terminal.draw(|frame| app.render(frame))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if let Some(cmd) = app.handle_key(key) {
                        dispatch(&mut app, &backend, cmd);
                    }
                }
                // Resize and other events are picked up on the next draw.
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(resp) = backend.recv() => {
                if let Some(cmd) = app.handle_response(resp) {
                    dispatch(&mut app, &backend, cmd);
                }
            }
            _ = tick.tick() => app.on_tick(),
        }
    }

    Ok(())
}

fn dispatch(app: &mut App, backend: &Backend, cmd: BackendCommand) {
    if let Err(cmd) = backend.send(cmd) {
        app.command_dropped(cmd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, PageResult};
    use crate::tui::messages::FetchState;

    fn app() -> App {
        App::new(&Settings::default(), LogBuffer::new())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn page_of(page: u32, total_pages: u32, n: usize) -> PageResult {
        PageResult {
            messages: (0..n)
                .map(|i| Message {
                    id: format!("{}-{}", page, i),
                    content: "hello".to_string(),
                    author: "anonymous".to_string(),
                    created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
                })
                .collect(),
            total: 10,
            page,
            per_page: 5,
            total_pages,
        }
    }

    fn requested(cmd: Option<BackendCommand>) -> Option<QueryKey> {
        cmd.map(|BackendCommand::LoadPage { key }| key)
    }

    #[test]
    fn test_pagination_keys() {
        let mut app = app();
        let first = requested(app.mount()).unwrap();
        assert_eq!(first, QueryKey::new(1, 5));

        app.handle_response(BackendResponse::Page {
            key: first,
            result: Ok(page_of(1, 2, 5)),
        });

        // Previous on page 1 does nothing.
        assert!(requested(app.handle_key(press(KeyCode::Left))).is_none());

        let next = requested(app.handle_key(press(KeyCode::Right))).unwrap();
        assert_eq!(next, QueryKey::new(2, 5));

        app.handle_response(BackendResponse::Page {
            key: next,
            result: Ok(page_of(2, 2, 5)),
        });
        assert_eq!(app.messages.page_info(), "Page 2 of 2");

        // Next on the last page does nothing.
        assert!(requested(app.handle_key(press(KeyCode::Char('n')))).is_none());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key(press(KeyCode::Char('q')));
        assert!(app.should_exit);

        let mut app = self::app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_exit);
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut app = app();
        let first = requested(app.mount()).unwrap();
        app.handle_response(BackendResponse::Page {
            key: first,
            result: Ok(page_of(1, 2, 5)),
        });

        app.handle_key(press(KeyCode::Char('?')));
        assert!(app.show_help);
        assert!(app.handle_key(press(KeyCode::Right)).is_none());
        assert_eq!(app.messages.page(), 1);

        app.handle_key(press(KeyCode::Esc));
        assert!(!app.show_help);
        assert!(!app.should_exit);
    }

    #[test]
    fn test_client_error_shown() {
        let mut app = app();
        app.mount();
        app.handle_response(BackendResponse::ClientError("no TLS backend".to_string()));
        assert_eq!(
            app.messages.fetch,
            FetchState::Error("no TLS backend".to_string())
        );
    }

    #[test]
    fn test_reload_after_client_error() {
        let mut app = app();
        let first = requested(app.mount()).unwrap();
        app.handle_response(BackendResponse::ClientError("no TLS backend".to_string()));

        let again = requested(app.handle_key(press(KeyCode::Char('r'))));
        assert_eq!(again, Some(first));
        assert_eq!(app.messages.fetch, FetchState::Loading);
    }

    #[test]
    fn test_dropped_command_can_be_retried() {
        let mut app = app();
        let cmd = app.mount().unwrap();
        app.command_dropped(cmd);
        assert_eq!(
            app.messages.fetch,
            FetchState::Error("Backend is not running".to_string())
        );

        let again = requested(app.handle_key(press(KeyCode::Char('r'))));
        assert_eq!(again, Some(QueryKey::new(1, 5)));
    }

    #[test]
    fn test_responses_recorded_in_debug_pane() {
        let mut app = app();
        let first = requested(app.mount()).unwrap();
        app.handle_response(BackendResponse::Page {
            key: first,
            result: Ok(page_of(1, 3, 5)),
        });

        // Page 2 answers after the user has already moved on to page 3.
        let second = requested(app.handle_key(press(KeyCode::Right))).unwrap();
        let third = requested(app.handle_key(press(KeyCode::Right))).unwrap();
        app.handle_response(BackendResponse::Page {
            key: second,
            result: Ok(page_of(2, 3, 5)),
        });
        app.handle_response(BackendResponse::Page {
            key: third,
            result: Err(crate::api::ApiError::InvalidPage {
                page: 3,
                per_page: 5,
            }),
        });

        let stats = app.debug_log.requests();
        assert_eq!((stats.loaded, stats.failed, stats.superseded), (1, 1, 1));
        assert!(matches!(
            stats.last,
            Some((key, RequestOutcome::Failed(_))) if key == third
        ));
    }

    #[test]
    fn test_reload_after_error() {
        let mut app = app();
        let first = requested(app.mount()).unwrap();
        app.handle_response(BackendResponse::Page {
            key: first,
            result: Err(crate::api::ApiError::InvalidPage {
                page: 1,
                per_page: 5,
            }),
        });

        let again = requested(app.handle_key(press(KeyCode::Char('r'))));
        assert_eq!(again, Some(first));
        assert_eq!(app.messages.fetch, FetchState::Loading);
    }
}
