//! Paginator configuration and per-call query parameters

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Items per page when nothing else is configured
pub const DEFAULT_PER_PAGE: u32 = 15;

/// Query string parameter carrying the page number
pub const DEFAULT_PAGE_NAME: &str = "page";

/// Order in which members are read from a sorted set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Lowest score first (ZRANGE / ZRANK)
    #[default]
    Asc,
    /// Highest score first (ZREVRANGE / ZREVRANK)
    Desc,
}

impl SortDirection {
    pub fn is_ascending(self) -> bool {
        matches!(self, SortDirection::Asc)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Shared paginator configuration
#[derive(Debug, Clone)]
pub struct PaginatorConfig {
    /// Page size used when a query does not set one
    pub default_per_page: u32,
    /// Query parameter name used in generated page URLs
    pub page_name: String,
    /// Base path used in generated page URLs
    pub path: String,
    /// Upper bound for a single store round trip
    pub command_timeout: Option<Duration>,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            page_name: DEFAULT_PAGE_NAME.to_string(),
            path: "/".to_string(),
            command_timeout: None,
        }
    }
}

impl PaginatorConfig {
    /// Load paginator configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_per_page: std::env::var("PAGINATOR_PER_PAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &u32| *v > 0)
                .unwrap_or(defaults.default_per_page),
            page_name: std::env::var("PAGINATOR_PAGE_NAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.page_name),
            path: std::env::var("PAGINATOR_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.path),
            command_timeout: std::env::var("PAGINATOR_COMMAND_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &u64| *v > 0)
                .map(Duration::from_millis),
        }
    }
}

/// Page size, page number and direction for a single call.
///
/// Zero values are never used against the store: a zero page size falls back
/// to [`DEFAULT_PER_PAGE`] and a zero page number to the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    per_page: u32,
    page: Option<u32>,
    direction: SortDirection,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            page: None,
            direction: SortDirection::Asc,
        }
    }
}

impl PageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a query with the configured default page size
    pub fn from_config(config: &PaginatorConfig) -> Self {
        Self::new().per_page(config.default_per_page)
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn sort_asc(self) -> Self {
        self.direction(SortDirection::Asc)
    }

    pub fn sort_desc(self) -> Self {
        self.direction(SortDirection::Desc)
    }

    pub fn direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn effective_per_page(&self) -> u32 {
        if self.per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            self.per_page
        }
    }

    /// Page number set on the query, if any
    pub fn requested_page(&self) -> Option<u32> {
        self.page
    }

    pub fn effective_page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery::new();
        assert_eq!(query.effective_per_page(), 15);
        assert_eq!(query.effective_page(), 1);
        assert_eq!(query.requested_page(), None);
        assert_eq!(query.sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn test_page_query_builder_overrides() {
        let query = PageQuery::new().per_page(2).page(8).sort_desc();
        assert_eq!(query.effective_per_page(), 2);
        assert_eq!(query.effective_page(), 8);
        assert_eq!(query.sort_direction(), SortDirection::Desc);

        let query = query.sort_asc();
        assert!(query.sort_direction().is_ascending());
    }

    #[test]
    fn test_zero_values_are_defaulted() {
        let query = PageQuery::new().per_page(0).page(0);
        assert_eq!(query.effective_per_page(), DEFAULT_PER_PAGE);
        assert_eq!(query.effective_page(), 1);
    }

    #[test]
    fn test_query_from_config() {
        let config = PaginatorConfig {
            default_per_page: 50,
            ..Default::default()
        };
        assert_eq!(PageQuery::from_config(&config).effective_per_page(), 50);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("PAGINATOR_PER_PAGE", "0");
        std::env::set_var("PAGINATOR_PAGE_NAME", "p");
        std::env::set_var("PAGINATOR_COMMAND_TIMEOUT_MS", "250");

        let config = PaginatorConfig::from_env();
        assert_eq!(config.default_per_page, DEFAULT_PER_PAGE);
        assert_eq!(config.page_name, "p");
        assert_eq!(config.path, "/");
        assert_eq!(config.command_timeout, Some(Duration::from_millis(250)));

        std::env::remove_var("PAGINATOR_PER_PAGE");
        std::env::remove_var("PAGINATOR_PAGE_NAME");
        std::env::remove_var("PAGINATOR_COMMAND_TIMEOUT_MS");
    }

    #[test]
    fn test_sort_direction_serde() {
        assert_eq!(
            serde_json::to_string(&SortDirection::Desc).unwrap(),
            "\"desc\""
        );
        let parsed: SortDirection = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(parsed, SortDirection::Asc);
    }
}
