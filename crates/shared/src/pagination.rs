//! Page/limit query handling shared by every list endpoint

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Raw `?page=&limit=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Pagination block included in list responses.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl PageInfo {
    pub fn new(query: PageQuery, total: i64) -> Self {
        let limit = query.limit();
        Self {
            page: query.page(),
            limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn limit_is_clamped() {
        let q = PageQuery {
            page: Some(2),
            limit: Some(10_000),
        };
        assert_eq!(q.limit(), 100);
        assert_eq!(q.offset(), 100);
    }

    #[test]
    fn pages_round_up() {
        let info = PageInfo::new(
            PageQuery {
                page: Some(1),
                limit: Some(10),
            },
            21,
        );
        assert_eq!(info.pages, 3);
    }
}
