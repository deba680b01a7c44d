//! Paginated list response

use serde::{Deserialize, Serialize};

use super::Message;

/// One page of messages plus pagination metadata.
///
/// Older backends omit `total_pages`; use [`PageResult::from_wire`] (or
/// deserialize through [`RawPageResult`]) so it is derived from `total` and
/// `per_page`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult {
    pub messages: Vec<Message>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

/// Wire shape of `GET /messages`.
#[derive(Debug, Deserialize)]
pub struct RawPageResult {
    pub messages: Vec<Message>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl PageResult {
    pub fn from_wire(raw: RawPageResult) -> Self {
        let total_pages = raw
            .total_pages
            .unwrap_or_else(|| page_count(raw.total, raw.per_page))
            .max(1);
        Self {
            messages: raw.messages,
            total: raw.total,
            page: raw.page,
            per_page: raw.per_page,
            total_pages,
        }
    }

    /// Whether a page before this one exists.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Whether a page after this one exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

impl<'de> Deserialize<'de> for PageResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        RawPageResult::deserialize(deserializer).map(Self::from_wire)
    }
}

/// Number of pages needed for `total` items, at least 1.
pub fn page_count(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 1;
    }
    let pages = total.div_ceil(per_page as u64).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
