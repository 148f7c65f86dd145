//! 列表接口共用的分页计算。

use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: u64 = 100;

/// SQLite 以有符号 64 位整数绑定 OFFSET
const MAX_OFFSET: u64 = i64::MAX as u64;

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// `"asc"` 为升序，其他值一律降序
    pub fn parse_lenient(raw: Option<&str>) -> SortOrder {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

impl From<SortOrder> for sea_orm::Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => sea_orm::Order::Asc,
            SortOrder::Desc => sea_orm::Order::Desc,
        }
    }
}

/// 从 1 开始的分页请求，每页数量有上下限。
/// 页码有上限，保证 OFFSET 可以绑定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>, default_limit: u64) -> Self {
        let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        let last_page = MAX_OFFSET / limit + 1;
        Self {
            page: page.unwrap_or(1).clamp(1, last_page),
            limit,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn describe(&self, total: u64) -> Pagination {
        Pagination {
            total,
            limit: self.limit,
            page: self.page,
            total_pages: total.div_ceil(self.limit),
        }
    }
}

/// 随列表数据返回的分页信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub limit: u64,
    pub page: u64,
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let page = PageRequest::new(None, None, 50);
        assert_eq!(page, PageRequest { page: 1, limit: 50 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn clamps_page_and_limit() {
        let page = PageRequest::new(Some(0), Some(0), 20);
        assert_eq!(page, PageRequest { page: 1, limit: 1 });

        let page = PageRequest::new(Some(3), Some(5_000), 20);
        assert_eq!(page.limit, MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 200);
    }

    #[test]
    fn huge_pages_keep_the_offset_in_range() {
        let page = PageRequest::new(Some(100_000_000_000_000_000), Some(100), 20);
        assert!(page.offset() <= i64::MAX as u64);
        assert_eq!(page.page, i64::MAX as u64 / 100 + 1);

        let page = PageRequest::new(Some(u64::MAX), Some(1), 20);
        assert_eq!(page.offset(), i64::MAX as u64);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = PageRequest::new(Some(2), Some(20), 20);
        assert_eq!(page.describe(41).total_pages, 3);
        assert_eq!(page.describe(40).total_pages, 2);
        assert_eq!(page.describe(0).total_pages, 0);
    }

    #[test]
    fn only_asc_sorts_ascending() {
        assert_eq!(SortOrder::parse_lenient(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse_lenient(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse_lenient(Some("up")), SortOrder::Desc);
        assert_eq!(SortOrder::parse_lenient(None), SortOrder::Desc);
    }
}
