//! Page-number arithmetic for feeds.
//!
//! Page numbers are 1-indexed. Requests outside the valid range are clamped
//! to the nearest page instead of failing, and an empty listing still has a
//! single (empty) first page.

use serde::Serialize;

/// Posts shown per feed page unless configured otherwise.
pub const DEFAULT_PER_PAGE: usize = 10;

/// A page number as requested by the client, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest(i64);

impl PageRequest {
    /// The first page.
    #[must_use]
    pub const fn first() -> Self {
        Self(1)
    }

    /// An explicit page number.
    #[must_use]
    pub const fn number(n: i64) -> Self {
        Self(n)
    }

    /// Parse a `?page=` query value. Missing or non-numeric input means page 1.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<i64>().ok())
            .map_or_else(Self::first, Self)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// Splits `count` items into pages of `per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: usize,
    per_page: usize,
}

impl Paginator {
    #[must_use]
    pub fn new(count: usize, per_page: usize) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    /// Total number of pages; never less than one.
    #[must_use]
    pub fn num_pages(&self) -> usize {
        if self.count == 0 {
            1
        } else {
            self.count.div_ceil(self.per_page)
        }
    }

    /// Resolve a request to a valid page number.
    #[must_use]
    pub fn clamp(&self, request: PageRequest) -> usize {
        let last = self.num_pages();
        match usize::try_from(request.0) {
            Ok(0) | Err(_) => 1,
            Ok(n) => n.min(last),
        }
    }

    /// Number of items preceding the given (valid) page.
    #[must_use]
    pub const fn offset(&self, number: usize) -> usize {
        number.saturating_sub(1) * self.per_page
    }

    /// Wrap already-fetched items for page `number`.
    #[must_use]
    pub fn page<T>(&self, number: usize, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number,
            num_pages: self.num_pages(),
            count: self.count,
            per_page: self.per_page,
        }
    }

    /// Cut the requested page out of a full in-memory listing.
    #[must_use]
    pub fn slice<T: Clone>(&self, request: PageRequest, all: &[T]) -> Page<T> {
        let number = self.clamp(request);
        let start = self.offset(number).min(all.len());
        let end = (start + self.per_page).min(all.len());
        self.page(number, all[start..end].to_vec())
    }
}

/// One page of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-indexed page number.
    pub number: usize,
    pub num_pages: usize,
    /// Items across all pages.
    pub count: usize,
    pub per_page: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }
}
