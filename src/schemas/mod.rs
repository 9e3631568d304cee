pub mod auth;
pub mod case;
pub mod message;
pub mod notification;
pub mod user;

pub use auth::*;
pub use case::*;
pub use message::*;
pub use notification::*;
pub use user::*;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// `?page=&limit=` query parameters (1-based page)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, page: u64, limit: u64, total: u64) -> Self {
        Self {
            data,
            meta: PageMeta {
                page,
                limit,
                total,
                total_pages: total.div_ceil(limit.max(1)),
            },
        }
    }
}
