use serde::{Deserialize, Serialize};

use crate::database::Window;
use crate::error::ApiError;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw `?page=&page_size=` query. Values are parsed by hand so bad input gets a precise 400.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub page_size: i64,
}

impl TryFrom<PageQuery> for PageParams {
    type Error = ApiError;

    fn try_from(query: PageQuery) -> Result<Self, Self::Error> {
        let page = match query.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|page| *page >= 1)
                .ok_or_else(|| ApiError::bad_request("Invalid page parameter"))?,
        };

        let page_size = match query.page_size.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_PAGE_SIZE,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
                .ok_or_else(|| {
                    ApiError::bad_request(format!(
                        "Invalid page_size parameter (must be 1-{})",
                        MAX_PAGE_SIZE
                    ))
                })?,
        };

        Ok(Self { page, page_size })
    }
}

impl PageParams {
    pub fn window(&self) -> Window {
        Window {
            offset: (self.page - 1).saturating_mul(self.page_size),
            limit: self.page_size,
        }
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            total,
            page: self.page,
            page_size: self.page_size,
            total_pages: (total + self.page_size - 1) / self.page_size,
        }
    }
}

/// Paging fields flattened next to the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}
