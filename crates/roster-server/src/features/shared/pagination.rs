//! Shared pagination utilities
//!
//! # Examples
//!
//! ```rust,ignore
//! use roster_server::features::shared::pagination::{PaginationMetadata, PaginationParams};
//!
//! let params = PaginationParams::new(Some(2), Some(20));
//! let offset = params.offset();
//!
//! // After fetching data...
//! let metadata = PaginationMetadata::from_params(&params, 100);
//! ```

use serde::{Deserialize, Serialize};

/// Default items per page
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest accepted page size
pub const MAX_LIMIT: i64 = 100;

/// Common pagination request parameters
///
/// Out-of-range values are replaced rather than rejected: a page below 1 becomes 1,
/// and a limit outside 1..=100 becomes the default of 20.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page. Defaults to 20.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// Get the page number (1-indexed), defaulting to 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get items per page, defaulting to 20
    pub fn limit(&self) -> i64 {
        match self.limit {
            Some(limit) if (1..=MAX_LIMIT).contains(&limit) => limit,
            _ => DEFAULT_LIMIT,
        }
    }

    /// Calculate the offset for SQL OFFSET clause
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// Pagination metadata for response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMetadata {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    pub fn from_params(params: &PaginationParams, total: i64) -> Self {
        Self::new(params.page(), params.limit(), total)
    }
}
