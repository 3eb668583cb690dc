//! Fixed-size pagination over ordered collections.
//!
//! Pagination is a two-step contract: [`Paginator::locate`] turns a total
//! count and a requested page into a [`PageWindow`], the store fetches
//! exactly that window, and [`PageWindow::fill`] wraps the rows into a
//! [`Page`]. [`Paginator::paginate`] does both steps over an in-memory
//! collection.
//!
//! Out-of-range requests never fail. Absent, malformed or non-positive page
//! numbers resolve to the first page; numbers past the end resolve to the
//! last page. An empty collection still has one (empty) page.

use serde::Serialize;

/// Items per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// A requested page, as read from the `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageNumber {
    #[default]
    First,
    Exact(u64),
    Last,
}

impl PageNumber {
    /// Parse the raw query value. Never fails.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::First;
        };

        match raw.parse::<i64>() {
            Ok(n) if n >= 1 => Self::Exact(n.unsigned_abs()),
            Ok(_) => Self::First,
            // A positive integer too large for i64 is still past the end.
            Err(_) => {
                let digits = raw.strip_prefix('+').unwrap_or(raw);
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    Self::Last
                } else {
                    Self::First
                }
            }
        }
    }
}

impl From<u64> for PageNumber {
    fn from(value: u64) -> Self {
        match value {
            0 => Self::First,
            n => Self::Exact(n),
        }
    }
}

/// Splits listings into pages of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// A page size of zero is treated as one.
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn num_pages(&self, count: u64) -> u64 {
        if count == 0 {
            1
        } else {
            count.div_ceil(self.per_page)
        }
    }

    /// Resolve `requested` against a collection of `count` items.
    pub fn locate(&self, count: u64, requested: PageNumber) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = match requested {
            PageNumber::First => 1,
            PageNumber::Exact(n) => n.clamp(1, num_pages),
            PageNumber::Last => num_pages,
        };

        PageWindow {
            number,
            num_pages,
            count,
            per_page: self.per_page,
        }
    }

    /// Slice an already ordered collection.
    pub fn paginate<T>(&self, items: Vec<T>, requested: PageNumber) -> Page<T> {
        let window = self.locate(items.len() as u64, requested);
        let page_items = items
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .collect();
        window.fill(page_items)
    }
}

/// The position of one page inside a listing, before its rows are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub per_page: u64,
}

impl PageWindow {
    /// Rows to skip.
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    /// Rows on this page.
    pub fn limit(&self) -> u64 {
        self.per_page.min(self.count.saturating_sub(self.offset()))
    }

    pub fn fill<T>(self, items: Vec<T>) -> Page<T> {
        debug_assert!(items.len() as u64 <= self.per_page);
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
        }
    }
}

/// One page of a listing plus what is needed to render "page N of M".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    /// Items across all pages.
    pub count: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    /// 1-based index of the first item on this page, 0 for an empty listing.
    pub fn start_index(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            (self.number - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last item on this page, 0 for an empty listing.
    pub fn end_index(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.start_index() + self.items.len() as u64 - 1
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
