//! Async backend: runs page fetches off the TUI event loop.
//!
//! The TUI sends `BackendCommand` values over an mpsc channel; a background
//! tokio task executes each one on its own task and sends a
//! `BackendResponse` back. Every response carries the key it was requested
//! with so the view can discard superseded results.

use tokio::sync::mpsc;

use crate::api::{self, ApiError, MessagesClient};
use crate::models::PageResult;
use crate::query::QueryKey;

pub enum BackendCommand {
    LoadPage { key: QueryKey },
}

pub enum BackendResponse {
    Page {
        key: QueryKey,
        result: Result<PageResult, ApiError>,
    },
    /// The HTTP client could not be created.
    ClientError(String),
}

/// Handle for interacting with the backend from the TUI side.
pub struct Backend {
    cmd_tx: mpsc::UnboundedSender<BackendCommand>,
    resp_rx: mpsc::UnboundedReceiver<BackendResponse>,
}

impl Backend {
    /// Spawn the backend task for the service at `api_url`.
    pub fn start(api_url: String) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, resp_rx) = mpsc::unbounded_channel();

        tokio::spawn(backend_loop(api_url, cmd_rx, resp_tx));

        Self { cmd_tx, resp_rx }
    }

    /// Send a command to the backend (non-blocking). Hands the command back
    /// if the backend task is gone.
    pub fn send(&self, cmd: BackendCommand) -> Result<(), BackendCommand> {
        self.cmd_tx.send(cmd).map_err(|e| {
            tracing::error!("Backend channel closed -- command dropped");
            e.0
        })
    }

    /// Next response. `None` once the backend task has exited.
    /// Designed to be used inside `tokio::select!`.
    pub async fn recv(&mut self) -> Option<BackendResponse> {
        self.resp_rx.recv().await
    }
}

async fn backend_loop(
    api_url: String,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    resp_tx: mpsc::UnboundedSender<BackendResponse>,
) {
    let client = match MessagesClient::new(&api_url) {
        Ok(c) => c,
        Err(e) => {
            let _ = resp_tx.send(BackendResponse::ClientError(e.to_string()));
            return;
        }
    };
    tracing::info!("Backend ready for {}", client.base_url());

    while let Some(cmd) = cmd_rx.recv().await {
        let client = client.clone();
        let resp_tx = resp_tx.clone();

        tokio::spawn(async move {
            match cmd {
                BackendCommand::LoadPage { key } => {
                    let result = api::fetch_messages(&client, key.page, key.per_page).await;
                    let _ = resp_tx.send(BackendResponse::Page { key, result });
                }
            }
        });
    }
}
