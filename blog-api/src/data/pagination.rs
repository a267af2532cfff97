use async_trait::async_trait;
use serde::Serialize;

use crate::domain::error::DomainError;

pub(crate) const DEFAULT_PAGE: i64 = 1;
pub(crate) const DEFAULT_PAGE_SIZE: i64 = 10;
pub(crate) const MAX_PAGE_SIZE: i64 = 100;

/// Raw page request as sent by the client. Out-of-range values are clamped,
/// never rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) page: i64,
    pub(crate) page_size: i64,
}

/// Offset/limit pair applied to a query to restrict it to one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub(crate) page: i64,
    pub(crate) limit: i64,
    pub(crate) offset: i64,
}

impl Pagination {
    pub(crate) fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    pub(crate) fn normalized(self) -> Self {
        let page = if self.page < 1 { DEFAULT_PAGE } else { self.page };
        let page_size = if self.page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size.min(MAX_PAGE_SIZE)
        };
        Self { page, page_size }
    }

    pub(crate) fn paginate(self) -> PageWindow {
        let Self { page, page_size } = self.normalized();
        PageWindow {
            page,
            limit: page_size,
            offset: (page - 1).saturating_mul(page_size),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PageResult<T> {
    pub(crate) data: Vec<T>,
    pub(crate) total: i64,
    pub(crate) page: i64,
    pub(crate) page_size: i64,
    pub(crate) total_pages: i64,
    pub(crate) has_more: bool,
}

impl<T> PageResult<T> {
    pub(crate) fn new(data: Vec<T>, total: i64, window: PageWindow) -> Self {
        let total = total.max(0);
        let page_size = window.limit;
        Self {
            data,
            total,
            page: window.page,
            page_size,
            total_pages: (total + page_size - 1) / page_size,
            has_more: window.page < total / page_size + 1,
        }
    }

    pub(crate) fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            has_more: self.has_more,
        }
    }
}

/// A filtered query that can be counted and fetched page by page.
///
/// Both phases take `&self`, so the filter predicate seen by `count` is the
/// one seen by `fetch`.
#[async_trait]
pub(crate) trait PagedQuery: Send + Sync {
    type Item: Send;

    async fn count(&self) -> Result<i64, DomainError>;
    async fn fetch(&self, window: PageWindow) -> Result<Vec<Self::Item>, DomainError>;
}

pub(crate) async fn get_paginated_data<Q>(
    query: &Q,
    pagination: Option<Pagination>,
) -> Result<PageResult<Q::Item>, DomainError>
where
    Q: PagedQuery + ?Sized,
{
    let window = pagination.unwrap_or_default().paginate();

    // count ignores the window, fetch applies it
    let total = query.count().await?;
    let data = query.fetch(window).await?;

    Ok(PageResult::new(data, total, window))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::{
        DomainError, PageResult, PageWindow, PagedQuery, Pagination, get_paginated_data,
    };

    struct EvenNumbers {
        upto: i64,
    }

    impl EvenNumbers {
        fn matching(&self) -> impl Iterator<Item = i64> {
            (1..=self.upto).filter(|n| n % 2 == 0)
        }
    }

    #[async_trait]
    impl PagedQuery for EvenNumbers {
        type Item = i64;

        async fn count(&self) -> Result<i64, DomainError> {
            Ok(self.matching().count() as i64)
        }

        async fn fetch(&self, window: PageWindow) -> Result<Vec<i64>, DomainError> {
            Ok(self
                .matching()
                .skip(window.offset as usize)
                .take(window.limit as usize)
                .collect())
        }
    }

    #[test]
    fn paginate_clamps_page_and_page_size() {
        assert_eq!(Pagination::new(0, 20).paginate().page, 1);
        assert_eq!(Pagination::new(-3, 20).paginate().page, 1);
        assert_eq!(Pagination::new(1, 0).paginate().limit, 10);
        assert_eq!(Pagination::new(1, -5).paginate().limit, 10);
        assert_eq!(Pagination::new(1, 101).paginate().limit, 100);
        assert_eq!(Pagination::new(1, 100).paginate().limit, 100);
    }

    #[test]
    fn paginate_computes_offset() {
        let window = Pagination::new(3, 20).paginate();
        assert_eq!(window.offset, 40);
        assert_eq!(window.limit, 20);

        let window = Pagination::default().paginate();
        assert_eq!(window.page, 1);
        assert_eq!(window.offset, 0);
        assert_eq!(window.limit, 10);
    }

    #[test]
    fn page_result_reports_total_pages_and_has_more() {
        let pages: Vec<PageResult<()>> = (1..=3)
            .map(|page| PageResult::new(Vec::new(), 25, Pagination::new(page, 10).paginate()))
            .collect();

        assert!(pages.iter().all(|p| p.total_pages == 3));
        assert!(pages[0].has_more);
        assert!(pages[1].has_more);
        assert!(!pages[2].has_more);
    }

    #[test]
    fn page_result_for_empty_set() {
        let result: PageResult<()> =
            PageResult::new(Vec::new(), 0, Pagination::default().paginate());
        assert_eq!(result.total_pages, 0);
        assert_eq!(result.total, 0);
    }

    #[tokio::test]
    async fn get_paginated_data_counts_and_fetches_same_predicate() {
        let query = EvenNumbers { upto: 50 };

        let result = get_paginated_data(&query, Some(Pagination::new(3, 10)))
            .await
            .expect("pagination must succeed");

        assert_eq!(result.total, 25);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.data, vec![42, 44, 46, 48, 50]);
        assert!(!result.has_more);
    }

    #[tokio::test]
    async fn get_paginated_data_defaults_when_pagination_is_missing() {
        let query = EvenNumbers { upto: 50 };

        let result = get_paginated_data(&query, None)
            .await
            .expect("pagination must succeed");

        assert_eq!(result.page, 1);
        assert_eq!(result.page_size, 10);
        assert_eq!(result.data.len(), 10);
        assert!(result.has_more);
    }
}
