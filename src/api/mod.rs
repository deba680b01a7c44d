//! API client module for the message service

pub mod client;
mod error;
mod health;
mod messages;
mod timestamp;

#[cfg(test)]
pub(crate) mod test_server;

use anyhow::Result;

pub use client::MessagesClient;
pub use error::ApiError;
pub use messages::fetch_messages;

/// Print one page of messages
pub async fn list_messages(api_url: &str, page: u32, per_page: u32) -> Result<()> {
    let client = MessagesClient::new(api_url)?;
    messages::list_messages(&client, page, per_page).await
}

/// Check service health
pub async fn health(api_url: &str) -> Result<()> {
    let client = MessagesClient::new(api_url)?;
    health::health(&client).await
}

/// Store the current time on the service
pub async fn write_timestamp(api_url: &str) -> Result<()> {
    let client = MessagesClient::new(api_url)?;
    timestamp::write(&client).await
}

/// Print the stored timestamp
pub async fn read_timestamp(api_url: &str) -> Result<()> {
    let client = MessagesClient::new(api_url)?;
    timestamp::read(&client).await
}
