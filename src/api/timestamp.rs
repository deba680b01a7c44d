//! Stored timestamp endpoints (POST /timestamp, GET /timestamp)

use anyhow::Result;
use serde::Deserialize;

use super::client::MessagesClient;
use super::error::ApiError;

/// Answer to `POST /timestamp`.
#[derive(Debug, Deserialize)]
pub struct WrittenTimestamp {
    pub status: String,
    #[serde(default)]
    pub message: String,
    /// RFC 3339 time the service recorded.
    pub timestamp: String,
}

/// Answer to `GET /timestamp`: the stored text, verbatim.
#[derive(Debug, Deserialize)]
pub struct StoredTimestamp {
    pub timestamp: String,
}

pub async fn write_timestamp(client: &MessagesClient) -> Result<WrittenTimestamp, ApiError> {
    client.post_json("/timestamp").await
}

pub async fn read_timestamp(client: &MessagesClient) -> Result<StoredTimestamp, ApiError> {
    client.get_json("/timestamp", &[]).await
}

/// Ask the service to store the current time and print what it wrote.
pub async fn write(client: &MessagesClient) -> Result<()> {
    let written = write_timestamp(client).await?;
    if !written.status.eq_ignore_ascii_case("success") {
        anyhow::bail!(
            "Service refused to store timestamp: {} {}",
            written.status,
            written.message
        );
    }
    tracing::debug!("{}", written.message);
    println!("Stored timestamp {}", written.timestamp);
    Ok(())
}

/// Print the last stored timestamp.
pub async fn read(client: &MessagesClient) -> Result<()> {
    let stored = read_timestamp(client).await?;
    println!("{}", stored.timestamp.trim_end());
    Ok(())
}
