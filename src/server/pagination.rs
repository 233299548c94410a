use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::deserializers::parse_page;
use super::error::ApiError;
use super::extractors::ApiQuery;

pub const QUESTIONS_PER_PAGE: usize = 10;

/// The `page` query parameter. The first occurrence wins and anything that is
/// not a number means page 1.
#[derive(Debug, Clone, Copy)]
pub struct PageQuery {
    pub page: i64,
}

impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ApiQuery(pairs): ApiQuery<Vec<(String, String)>> =
            ApiQuery::from_request_parts(parts, state).await?;
        let first = pairs
            .iter()
            .find(|(key, _)| key == "page")
            .map(|(_, value)| value.as_str());
        Ok(Self {
            page: parse_page(first),
        })
    }
}

/// One page of a listing together with the size of the whole listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    /// Slices `items` to the 1-based `page`. Pages past the end, and pages
    /// below 1, are empty.
    pub fn of(items: Vec<T>, page: i64) -> Self {
        let total = items.len();
        if page < 1 {
            return Self {
                items: Vec::new(),
                total,
            };
        }
        let start = usize::try_from(page - 1)
            .ok()
            .and_then(|p| p.checked_mul(QUESTIONS_PER_PAGE))
            .unwrap_or(usize::MAX);
        Self {
            items: items
                .into_iter()
                .skip(start)
                .take(QUESTIONS_PER_PAGE)
                .collect(),
            total,
        }
    }
}
