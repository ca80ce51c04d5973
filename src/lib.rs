//! Sorted set pagination
//!
//! Paginated and rank-lookup access over Redis sorted sets with:
//! - Page fetching by rank range, ascending or descending
//! - Atomic rank + score lookup for a single member (Lua script)
//! - Pluggable resolution of members into external records, preserving set order
//! - Length-aware pagination envelope with page links
//! - Metrics integration

mod error;
mod key;
mod metrics;

pub mod config;
pub mod envelope;
pub mod fetcher;
pub mod locator;
pub mod paginator;
pub mod resolver;
pub mod store;

pub use config::{
    PageQuery, PaginatorConfig, SortDirection, DEFAULT_PAGE_NAME, DEFAULT_PER_PAGE,
};
pub use envelope::{LengthAwarePage, PageLinks};
pub use error::{PaginatorError, PaginatorResult};
pub use fetcher::{Page, PageFetcher};
pub use key::SortedSetKey;
pub use locator::{MemberRank, RankLocator};
pub use metrics::PaginatorMetrics;
pub use paginator::SortedSetPaginator;
pub use resolver::{KeyMapping, ResultResolver, ScoredRecord};
pub use store::{
    MemorySortedSetStore, RankAndScore, RankRange, RedisSortedSetStore, ScoredMember,
    SharedRedis, SortedSetStore,
};
