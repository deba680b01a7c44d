//! `GET /messages` – paginated message listing

use anyhow::Result;

use super::client::MessagesClient;
use super::error::ApiError;
use crate::models::PageResult;

/// Fetch one page of messages.
pub async fn fetch_messages(
    client: &MessagesClient,
    page: u32,
    per_page: u32,
) -> Result<PageResult, ApiError> {
    if page == 0 || per_page == 0 {
        return Err(ApiError::InvalidPage { page, per_page });
    }

    let query = [("page", page.to_string()), ("per_page", per_page.to_string())];
    let result: PageResult = client.get_json("/messages", &query).await?;

    tracing::debug!(
        "Fetched page {}/{} ({} messages, {} total)",
        result.page,
        result.total_pages,
        result.messages.len(),
        result.total
    );
    Ok(result)
}

/// Fetch a page and print it to stdout.
pub async fn list_messages(client: &MessagesClient, page: u32, per_page: u32) -> Result<()> {
    let result = fetch_messages(client, page, per_page).await?;

    if result.messages.is_empty() {
        println!("(no messages)");
    }

    for msg in &result.messages {
        println!("[{}] {}: {}", msg.formatted_time(), msg.author, msg.content);
    }

    println!("{:-<60}", "");
    println!(
        "Page {} of {} ({} messages)",
        result.page, result.total_pages, result.total
    );
    if result.has_previous() {
        println!("Previous: --page {}", result.page - 1);
    }
    if result.has_next() {
        println!("Next:     --page {}", result.page + 1);
    }

    Ok(())
}
