// src/common/pagination.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

// Parâmetros de query `?page=2&limit=50`
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Página (começa em 1)
    pub page: Option<i64>,
    /// Itens por página (1..=100, padrão 20)
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page: Some(page), limit: Some(limit) }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, params: &PageParams, total: i64) -> Self {
        let limit = params.limit();
        let total_pages = if total <= 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            data,
            page: params.page(),
            limit,
            total: total.max(0),
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let p = PageParams::default();
        assert_eq!((p.page(), p.limit(), p.offset()), (1, 20, 0));

        let p = PageParams::new(0, 500);
        assert_eq!((p.page(), p.limit()), (1, MAX_PAGE_SIZE));

        let p = PageParams::new(-3, 0);
        assert_eq!((p.page(), p.limit()), (1, 1));
    }

    #[test]
    fn offset_follows_page_and_limit() {
        assert_eq!(PageParams::new(3, 25).offset(), 50);
        assert_eq!(PageParams::new(1, 10).offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let params = PageParams::new(1, 20);
        assert_eq!(Paginated::<u8>::new(vec![], &params, 0).total_pages, 0);
        assert_eq!(Paginated::<u8>::new(vec![], &params, 20).total_pages, 1);
        assert_eq!(Paginated::<u8>::new(vec![], &params, 21).total_pages, 2);
        assert_eq!(Paginated::<u8>::new(vec![], &params, 39).total_pages, 2);
    }

    #[test]
    fn deserializes_from_query_string() {
        let p: PageParams = serde_json::from_str(r#"{"page": 4}"#).unwrap();
        assert_eq!((p.page(), p.limit(), p.offset()), (4, 20, 60));
    }
}
