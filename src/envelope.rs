//! Length-aware pagination envelope
//!
//! Wraps a fetched [`Page`] with the request path and page parameter name so
//! callers can render page links and JSON metadata. All numbers come from the
//! fetch: `total` is the set cardinality even when a resolver dropped items.

use crate::config::{PaginatorConfig, DEFAULT_PAGE_NAME};
use crate::fetcher::Page;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Where page links point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    path: String,
    page_name: String,
}

impl PageLinks {
    /// Trailing slashes are trimmed from `path` unless it is the root
    pub fn new(path: impl Into<String>, page_name: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path == "/" {
            path
        } else {
            path.trim_end_matches('/').to_string()
        };

        let page_name = page_name.into();
        let page_name = if page_name.is_empty() {
            DEFAULT_PAGE_NAME.to_string()
        } else {
            page_name
        };

        Self { path, page_name }
    }

    pub fn from_config(config: &PaginatorConfig) -> Self {
        Self::new(config.path.clone(), config.page_name.clone())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn page_name(&self) -> &str {
        &self.page_name
    }

    /// URL for `page`, appending the page parameter to any existing query string
    pub fn url(&self, page: u64) -> String {
        let separator = if self.path.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}={}",
            self.path,
            separator,
            urlencoding::encode(&self.page_name),
            page.max(1)
        )
    }
}

impl Default for PageLinks {
    fn default() -> Self {
        Self::new("/", DEFAULT_PAGE_NAME)
    }
}

/// A page that knows the total item count
#[derive(Debug, Clone, PartialEq)]
pub struct LengthAwarePage<T> {
    page: Page<T>,
    links: PageLinks,
}

impl<T> LengthAwarePage<T> {
    pub fn new(page: Page<T>, links: PageLinks) -> Self {
        Self { page, links }
    }

    pub fn items(&self) -> &[T] {
        &self.page.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.page.items
    }

    pub fn into_page(self) -> Page<T> {
        self.page
    }

    pub fn links(&self) -> &PageLinks {
        &self.links
    }

    pub fn total(&self) -> u64 {
        self.page.total
    }

    pub fn per_page(&self) -> u32 {
        self.page.per_page
    }

    pub fn current_page(&self) -> u32 {
        self.page.current_page
    }

    pub fn count(&self) -> usize {
        self.page.items.len()
    }

    /// `max(ceil(total / per_page), 1)`
    pub fn last_page(&self) -> u64 {
        let per_page = u64::from(self.page.per_page.max(1));
        self.page.total.div_ceil(per_page).max(1)
    }

    /// One-based position of the first item on this page
    pub fn first_item(&self) -> Option<u64> {
        if self.page.items.is_empty() {
            return None;
        }
        let per_page = u64::from(self.page.per_page);
        Some((u64::from(self.page.current_page.max(1)) - 1) * per_page + 1)
    }

    pub fn last_item(&self) -> Option<u64> {
        self.first_item()
            .map(|first| first + self.page.items.len() as u64 - 1)
    }

    pub fn on_first_page(&self) -> bool {
        self.page.current_page <= 1
    }

    pub fn has_more_pages(&self) -> bool {
        u64::from(self.page.current_page) < self.last_page()
    }

    pub fn url(&self, page: u64) -> String {
        self.links.url(page)
    }

    pub fn first_page_url(&self) -> String {
        self.url(1)
    }

    pub fn last_page_url(&self) -> String {
        self.url(self.last_page())
    }

    pub fn next_page_url(&self) -> Option<String> {
        self.has_more_pages()
            .then(|| self.url(u64::from(self.page.current_page) + 1))
    }

    pub fn previous_page_url(&self) -> Option<String> {
        (self.page.current_page > 1).then(|| self.url(u64::from(self.page.current_page) - 1))
    }
}

impl<T: Serialize> Serialize for LengthAwarePage<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LengthAwarePage", 12)?;
        state.serialize_field("current_page", &self.current_page())?;
        state.serialize_field("data", &self.page.items)?;
        state.serialize_field("first_page_url", &self.first_page_url())?;
        state.serialize_field("from", &self.first_item())?;
        state.serialize_field("last_page", &self.last_page())?;
        state.serialize_field("last_page_url", &self.last_page_url())?;
        state.serialize_field("next_page_url", &self.next_page_url())?;
        state.serialize_field("path", self.links.path())?;
        state.serialize_field("per_page", &self.per_page())?;
        state.serialize_field("prev_page_url", &self.previous_page_url())?;
        state.serialize_field("to", &self.last_item())?;
        state.serialize_field("total", &self.total())?;
        state.end()
    }
}
