//! Offset pagination arithmetic for the user listing.

use serde::Serialize;

/// Page served when the caller does not ask for one.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: u64 = 10;
/// Largest page size a caller may request.
pub const MAX_LIMIT: u64 = 100;

/// Reasons a pagination request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// `page` or `limit` did not parse as an integer.
    #[error("Invalid page or limit parameter, must be an integer")]
    NotAnInteger,
    /// `page` or `limit` was zero or negative.
    #[error("page and limit must be positive integers")]
    NotPositive,
    /// `limit` exceeded [`MAX_LIMIT`].
    #[error("limit must not exceed {max}")]
    LimitTooLarge { max: u64 },
    /// The requested offset does not fit the store's offset type.
    #[error("page is out of range")]
    OutOfRange,
}

/// Validated `(page, limit)` pair.
///
/// ## Invariants
/// - `page >= 1` and `1 <= limit <= MAX_LIMIT`.
/// - `offset() = (page - 1) * limit` fits in an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
    offset: i64,
}

impl PageRequest {
    /// Validate numeric inputs.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::pagination::PageRequest;
    ///
    /// let request = PageRequest::new(3, 10).expect("valid page");
    /// assert_eq!(request.offset(), 20);
    /// assert!(PageRequest::new(1, 0).is_err());
    /// ```
    pub fn new(page: i64, limit: i64) -> Result<Self, PaginationError> {
        let (Ok(page), Ok(limit)) = (u64::try_from(page), u64::try_from(limit)) else {
            return Err(PaginationError::NotPositive);
        };
        if page == 0 || limit == 0 {
            return Err(PaginationError::NotPositive);
        }
        if limit > MAX_LIMIT {
            return Err(PaginationError::LimitTooLarge { max: MAX_LIMIT });
        }
        let offset = (page - 1)
            .checked_mul(limit)
            .and_then(|skip| i64::try_from(skip).ok())
            .ok_or(PaginationError::OutOfRange)?;
        Ok(Self {
            page,
            limit,
            offset,
        })
    }

    /// Parse raw query-string values, applying defaults for absent ones.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, PaginationError> {
        let page = parse_param(page, DEFAULT_PAGE)?;
        let limit = parse_param(limit, DEFAULT_LIMIT)?;
        Self::new(page, limit)
    }

    /// One-based page number.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Maximum number of records on the page.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Records skipped before the page starts.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Number of pages needed to show `total` records.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

fn parse_param(raw: Option<&str>, default: u64) -> Result<i64, PaginationError> {
    match raw {
        None => i64::try_from(default).map_err(|_| PaginationError::OutOfRange),
        Some(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| PaginationError::NotAnInteger),
    }
}

/// One page of results plus collection-wide totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    #[serde(rename = "users")]
    pub items: Vec<T>,
    #[serde(rename = "total_users")]
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Assemble a page for `request` out of `items` and the collection size.
    pub fn new(request: PageRequest, items: Vec<T>, total: u64) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            total_pages: request.total_pages(total),
        }
    }
}
