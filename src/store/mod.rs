//! Sorted set store abstraction
//!
//! The paginator only reads from the store. Implementations provide:
//! - Range by rank (ascending and descending) with scores
//! - Cardinality
//! - Rank and score of one member, read atomically

mod memory;
mod redis_store;

pub use self::memory::MemorySortedSetStore;
pub use self::redis_store::{RedisSortedSetStore, SharedRedis};

use crate::config::SortDirection;
use crate::error::PaginatorResult;
use crate::key::SortedSetKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A member of a sorted set together with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMember {
    pub member: String,
    pub score: f64,
}

impl ScoredMember {
    pub fn new(member: impl Into<String>, score: f64) -> Self {
        Self {
            member: member.into(),
            score,
        }
    }
}

impl From<(String, f64)> for ScoredMember {
    fn from((member, score): (String, f64)) -> Self {
        Self { member, score }
    }
}

/// Inclusive, zero-based rank range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankRange {
    pub start: u64,
    pub end: u64,
}

impl RankRange {
    /// Ranks covered by a one-based page: `[(page-1)*per_page, page*per_page - 1]`
    pub fn for_page(page: u32, per_page: u32) -> Self {
        let page = u64::from(page.max(1));
        let per_page = u64::from(per_page.max(1));
        let start = (page - 1) * per_page;
        Self {
            start,
            end: start + per_page - 1,
        }
    }

    /// Number of ranks covered, always equal to the page size
    pub fn count(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Result of the combined rank and score lookup.
///
/// Either field is `None` when the member (or the whole set) does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RankAndScore {
    pub rank: Option<u64>,
    pub score: Option<f64>,
}

/// Read operations required from a sorted set store
#[async_trait]
pub trait SortedSetStore: Send + Sync {
    /// Members in `range` with their scores, in store order for `direction`
    async fn range_by_rank(
        &self,
        key: &SortedSetKey,
        range: RankRange,
        direction: SortDirection,
    ) -> PaginatorResult<Vec<ScoredMember>>;

    /// Number of members in the set (0 for a missing set)
    async fn cardinality(&self, key: &SortedSetKey) -> PaginatorResult<u64>;

    /// Rank under `direction` and score of `member`, read as one indivisible operation
    async fn rank_and_score(
        &self,
        key: &SortedSetKey,
        member: &str,
        direction: SortDirection,
    ) -> PaginatorResult<RankAndScore>;
}

#[async_trait]
impl<S> SortedSetStore for Arc<S>
where
    S: SortedSetStore + ?Sized,
{
    async fn range_by_rank(
        &self,
        key: &SortedSetKey,
        range: RankRange,
        direction: SortDirection,
    ) -> PaginatorResult<Vec<ScoredMember>> {
        (**self).range_by_rank(key, range, direction).await
    }

    async fn cardinality(&self, key: &SortedSetKey) -> PaginatorResult<u64> {
        (**self).cardinality(key).await
    }

    async fn rank_and_score(
        &self,
        key: &SortedSetKey,
        member: &str,
        direction: SortDirection,
    ) -> PaginatorResult<RankAndScore> {
        (**self).rank_and_score(key, member, direction).await
    }
}
