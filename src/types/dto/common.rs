use chrono::{DateTime, Utc};
use poem_openapi::{ApiResponse, Object};

use crate::stores;

/// Pagination metadata describing a windowed result set
#[derive(Object, Debug)]
pub struct PageMeta {
    /// Total number of records across all pages
    pub total: u64,

    /// Current page (1-indexed)
    pub page: u64,

    /// Last page number (`ceil(total / page_size)`)
    pub last_page: u64,
}

impl From<stores::PageMeta> for PageMeta {
    fn from(meta: stores::PageMeta) -> Self {
        Self {
            total: meta.total,
            page: meta.page,
            last_page: meta.last_page,
        }
    }
}

/// Empty 204 response shared by every delete endpoint
#[derive(ApiResponse, Debug)]
pub enum DeletedResponse {
    /// Resource deleted
    #[oai(status = 204)]
    NoContent,
}

/// Render a stored Unix timestamp as ISO 8601 for response bodies
pub fn format_timestamp(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}
