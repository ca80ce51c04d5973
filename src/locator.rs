//! Member rank lookup

use crate::config::PageQuery;
use crate::error::PaginatorResult;
use crate::key::SortedSetKey;
use crate::metrics::PaginatorMetrics;
use crate::store::SortedSetStore;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Position of a member within a sorted set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberRank {
    /// One-based page the member appears on
    pub page: u64,
    /// Zero-based rank under the query's direction
    pub rank: u64,
    pub score: f64,
}

impl MemberRank {
    /// Derive the page from a zero-based rank: `floor(rank / per_page) + 1`
    pub fn from_rank(rank: u64, score: f64, per_page: u32) -> Self {
        let per_page = u64::from(per_page.max(1));
        Self {
            page: rank / per_page + 1,
            rank,
            score,
        }
    }
}

/// Finds the rank, score and page of a single member
pub struct RankLocator<S> {
    store: S,
    metrics: PaginatorMetrics,
}

impl<S: SortedSetStore> RankLocator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            metrics: PaginatorMetrics::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Look up `member`. `Ok(None)` means the member (or the set) does not exist.
    pub async fn locate(
        &self,
        key: &str,
        member: &str,
        query: &PageQuery,
    ) -> PaginatorResult<Option<MemberRank>> {
        let key = SortedSetKey::parse(key)?;
        let direction = query.sort_direction();

        let found = self.store.rank_and_score(&key, member, direction).await?;

        let (Some(rank), Some(score)) = (found.rank, found.score) else {
            debug!(key = %key, member, "Member not found in sorted set");
            self.metrics.record_rank_missing();
            return Ok(None);
        };

        let member_rank = MemberRank::from_rank(rank, score, query.effective_per_page());
        debug!(
            key = %key,
            member,
            direction = direction.as_str(),
            rank,
            page = member_rank.page,
            "Member rank located"
        );
        self.metrics.record_rank_found();

        Ok(Some(member_rank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaginatorError;
    use crate::store::MemorySortedSetStore;

    async fn leaderboard(n: u32) -> MemorySortedSetStore {
        let store = MemorySortedSetStore::new();
        for i in 1..=n {
            store
                .zadd("leaderboard", &format!("user:{}", i), f64::from(i * 1000))
                .await;
        }
        store
    }

    #[test]
    fn test_page_from_rank() {
        assert_eq!(MemberRank::from_rank(0, 1.0, 15).page, 1);
        assert_eq!(MemberRank::from_rank(14, 1.0, 15).page, 1);
        assert_eq!(MemberRank::from_rank(15, 1.0, 15).page, 2);
        assert_eq!(MemberRank::from_rank(16, 1.0, 2).page, 9);
    }

    #[tokio::test]
    async fn test_locate_ascending() {
        let locator = RankLocator::new(leaderboard(25).await);
        let rank = locator
            .locate("leaderboard", "user:7", &PageQuery::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            rank,
            MemberRank {
                page: 1,
                rank: 6,
                score: 7000.0
            }
        );
    }

    #[tokio::test]
    async fn test_locate_descending() {
        let locator = RankLocator::new(leaderboard(25).await);
        let rank = locator
            .locate("leaderboard", "user:7", &PageQuery::new().sort_desc())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(rank.page, 2);
        assert_eq!(rank.rank, 18);
        assert_eq!(rank.score, 7000.0);
    }

    #[tokio::test]
    async fn test_missing_member_is_none() {
        let locator = RankLocator::new(leaderboard(25).await);
        let query = PageQuery::new();

        assert!(locator
            .locate("leaderboard", "invalid-user", &query)
            .await
            .unwrap()
            .is_none());
        assert!(locator
            .locate("invalid-key", "invalid-user", &query)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let locator = RankLocator::new(leaderboard(1).await);
        let result = locator.locate("", "user:1", &PageQuery::new()).await;

        assert!(matches!(result, Err(PaginatorError::InvalidKey)));
        assert_eq!(locator.store().call_count(), 0);
    }
}
