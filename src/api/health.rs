//! Service health endpoint (/health)

use anyhow::Result;
use serde::Deserialize;

use super::client::MessagesClient;
use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

pub async fn check_health(client: &MessagesClient) -> Result<HealthStatus, ApiError> {
    client.get_json("/health", &[]).await
}

/// Query /health and print the result.
pub async fn health(client: &MessagesClient) -> Result<()> {
    let status = check_health(client).await?;
    println!("{}: {}", client.base_url(), status.status);
    if !status.is_ok() {
        anyhow::bail!("Service reported status '{}'", status.status);
    }
    Ok(())
}
