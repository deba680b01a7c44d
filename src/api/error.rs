//! Errors produced by the message service client

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, timeout, TLS failure, ...
    #[error("Failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("Failed to fetch {url}: HTTP {status}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The body was not the JSON we expected.
    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid page request: page={page}, per_page={per_page}")]
    InvalidPage { page: u32, per_page: u32 },

    #[error("Invalid URL {0}")]
    Url(String),
}

impl ApiError {
    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
