//! In-memory log sink for TUI mode
//!
//! While the alternate screen is active, tracing output written to stderr
//! would corrupt the display. `LogBuffer` implements `MakeWriter` so the fmt
//! layer writes complete lines into a bounded queue instead; the debug log
//! pane drains it.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

/// Lines kept before the oldest are discarded.
const DEFAULT_CAPACITY: usize = 500;

struct Lines {
    queue: VecDeque<String>,
    capacity: usize,
    /// Lines discarded because the queue was full.
    dropped: u64,
}

/// Shared, bounded queue of log lines.
#[derive(Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<Lines>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Lines {
                queue: VecDeque::with_capacity(capacity),
                capacity: capacity.max(1),
                dropped: 0,
            })),
        }
    }

    // A panic while holding the lock must not take logging down with it.
    fn lock(&self) -> MutexGuard<'_, Lines> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, line: String) {
        let mut lines = self.lock();
        if lines.queue.len() >= lines.capacity {
            lines.queue.pop_front();
            lines.dropped += 1;
        }
        lines.queue.push_back(line);
    }

    /// Take all queued lines, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.lock().queue.drain(..).collect()
    }

    /// Total lines discarded since creation.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer handed out per log event; forwards complete lines to the buffer.
pub struct LineWriter {
    target: LogBuffer,
    partial: Vec<u8>,
}

impl LineWriter {
    fn emit_complete_lines(&mut self) {
        while let Some(nl) = self.partial.iter().position(|&b| b == b'\n') {
            let rest = self.partial.split_off(nl + 1);
            let mut line = std::mem::replace(&mut self.partial, rest);
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            self.target.push(String::from_utf8_lossy(&line).into_owned());
        }
    }
}

impl Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial.extend_from_slice(buf);
        self.emit_complete_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.partial.is_empty() {
            let line = String::from_utf8_lossy(&self.partial).into_owned();
            self.partial.clear();
            self.target.push(line);
        }
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter {
            target: self.clone(),
            partial: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain() {
        let buf = LogBuffer::new();
        buf.push("first".to_string());
        buf.push("second".to_string());

        assert_eq!(buf.drain(), vec!["first", "second"]);
        assert!(buf.drain().is_empty());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let buf = LogBuffer::with_capacity(3);
        for i in 0..5 {
            buf.push(format!("line {}", i));
        }

        assert_eq!(buf.drain(), vec!["line 2", "line 3", "line 4"]);
        assert_eq!(buf.dropped(), 2);
    }

    #[test]
    fn test_writer_splits_lines() {
        let buf = LogBuffer::new();
        let mut w = buf.make_writer();
        w.write_all(b"GET /messages\r\nfetched page 1\npart").unwrap();

        assert_eq!(buf.drain(), vec!["GET /messages", "fetched page 1"]);

        drop(w);
        assert_eq!(buf.drain(), vec!["part"]);
    }

    #[test]
    fn test_subscriber_writes_into_buffer() {
        use tracing_subscriber::layer::SubscriberExt;

        let buf = LogBuffer::new();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(buf.clone()),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("page 2 loaded");
        });

        let lines = buf.drain();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("page 2 loaded"));
    }
}
