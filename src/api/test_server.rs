//! Minimal in-process HTTP server for client tests.
//!
//! Answers every connection with whatever the handler returns for the
//! request line (e.g. `GET /messages?page=1&per_page=5 HTTP/1.1`).

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Handler = Arc<dyn Fn(&str) -> (u16, String) + Send + Sync>;

pub struct TestServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let handler = Arc::clone(&handler);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let mut read = 0;
                    loop {
                        let n = sock.read(&mut buf[read..]).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        read += n;
                        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") || read == buf.len()
                        {
                            break;
                        }
                    }

                    let head = String::from_utf8_lossy(&buf[..read]);
                    let line = head.lines().next().unwrap_or("").to_string();
                    recorded.lock().unwrap().push(line.clone());

                    let (status, body) = handler(&line);
                    let reason = if status < 400 { "OK" } else { "Error" };
                    let resp = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason,
                        body.len(),
                        body
                    );
                    let _ = sock.write_all(resp.as_bytes()).await;
                    let _ = sock.shutdown().await;
                });
            }
        });

        Self {
            url: format!("http://{}", addr),
            requests,
        }
    }

    /// Request lines received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// JSON body for a page of `count` messages.
pub fn page_body(page: u32, per_page: u32, total: u64, count: usize) -> String {
    let first = (page as usize - 1) * per_page as usize;
    let messages: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            let id = first + i + 1;
            serde_json::json!({
                "id": id.to_string(),
                "content": format!("message {}", id),
                "author": "anonymous",
                "created_at": "2024-01-01T00:00:00Z",
            })
        })
        .collect();
    let total_pages = crate::models::page_count(total, per_page);
    serde_json::json!({
        "messages": messages,
        "total": total,
        "page": page,
        "per_page": per_page,
        "total_pages": total_pages,
    })
    .to_string()
}
