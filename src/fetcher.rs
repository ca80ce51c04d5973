//! Page fetching over a sorted set
//!
//! A page is the inclusive rank range `[(page-1)*per_page, page*per_page - 1]`
//! read in the query's direction. The total is the set cardinality, read
//! separately from the range, so it is unaffected by resolver drops.

use crate::config::PageQuery;
use crate::error::PaginatorResult;
use crate::key::SortedSetKey;
use crate::metrics::PaginatorMetrics;
use crate::resolver::{self, ResultResolver};
use crate::store::{RankRange, ScoredMember, SortedSetStore};
use serde::Serialize;
use tracing::debug;

/// One page of items plus the numbers needed to build a pagination envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items in store order
    pub items: Vec<T>,
    /// Cardinality of the whole set
    pub total: u64,
    /// Effective page size
    pub per_page: u32,
    /// Effective one-based page number
    pub current_page: u32,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl Page<ScoredMember> {
    /// Score of `member` if it is on this page
    pub fn score_of(&self, member: &str) -> Option<f64> {
        self.items
            .iter()
            .find(|m| m.member == member)
            .map(|m| m.score)
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|m| m.member.as_str())
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Reads pages of a sorted set
pub struct PageFetcher<S> {
    store: S,
    metrics: PaginatorMetrics,
}

impl<S: SortedSetStore> PageFetcher<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            metrics: PaginatorMetrics::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch raw `(member, score)` pairs for the query's page
    pub async fn fetch(
        &self,
        key: &str,
        query: &PageQuery,
    ) -> PaginatorResult<Page<ScoredMember>> {
        let key = SortedSetKey::parse(key)?;
        self.load(&key, query).await
    }

    /// Fetch the query's page and hand it to `resolver`.
    ///
    /// `total` stays the raw cardinality, so a page with dropped members
    /// holds fewer items than the envelope metadata suggests.
    pub async fn fetch_resolved<R>(
        &self,
        key: &str,
        query: &PageQuery,
        resolver: &R,
    ) -> PaginatorResult<Page<R::Record>>
    where
        R: ResultResolver + ?Sized,
    {
        let key = SortedSetKey::parse(key)?;
        let page = self.load(&key, query).await?;

        let raw_count = page.items.len();
        let items = resolver::resolve(resolver, &page.items).await?;

        let dropped = raw_count - items.len();
        if dropped > 0 {
            debug!(key = %key, dropped, "Members without a resolved record dropped from page");
            self.metrics.record_dropped(dropped);
        }

        Ok(Page {
            items,
            total: page.total,
            per_page: page.per_page,
            current_page: page.current_page,
        })
    }

    async fn load(
        &self,
        key: &SortedSetKey,
        query: &PageQuery,
    ) -> PaginatorResult<Page<ScoredMember>> {
        let per_page = query.effective_per_page();
        let current_page = query.effective_page();
        let direction = query.sort_direction();
        let range = RankRange::for_page(current_page, per_page);

        let (items, total) = tokio::try_join!(
            self.store.range_by_rank(key, range, direction),
            self.store.cardinality(key),
        )?;

        debug!(
            key = %key,
            start = range.start,
            end = range.end,
            direction = direction.as_str(),
            count = items.len(),
            total,
            "Sorted set page fetched"
        );
        self.metrics.record_page(direction.as_str());

        Ok(Page {
            items,
            total,
            per_page,
            current_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaginatorError;
    use crate::store::MemorySortedSetStore;

    async fn leaderboard(n: u32) -> MemorySortedSetStore {
        let store = MemorySortedSetStore::new();
        for i in (1..=n).rev() {
            store
                .zadd("leaderboard", &format!("user:{}", i), f64::from(i * 1000))
                .await;
        }
        store
    }

    #[tokio::test]
    async fn test_fetch_default_page() {
        let fetcher = PageFetcher::new(leaderboard(25).await);
        let page = fetcher.fetch("leaderboard", &PageQuery::new()).await.unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.per_page, 15);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.len(), 15);
        assert_eq!(page.items.first().unwrap().member, "user:1");
        assert_eq!(page.items.last().unwrap().member, "user:15");
        assert_eq!(page.score_of("user:15"), Some(15000.0));
        assert_eq!(page.score_of("user:16"), None);
    }

    #[tokio::test]
    async fn test_fetch_partial_last_page() {
        let fetcher = PageFetcher::new(leaderboard(25).await);
        let page = fetcher
            .fetch("leaderboard", &PageQuery::new().page(2))
            .await
            .unwrap();

        assert_eq!(page.len(), 10);
        let members: Vec<&str> = page.members().collect();
        assert_eq!(members.first(), Some(&"user:16"));
        assert_eq!(members.last(), Some(&"user:25"));
    }

    #[tokio::test]
    async fn test_fetch_descending() {
        let fetcher = PageFetcher::new(leaderboard(25).await);
        let page = fetcher
            .fetch("leaderboard", &PageQuery::new().sort_desc())
            .await
            .unwrap();

        assert_eq!(page.items[0], ScoredMember::new("user:25", 25000.0));
        assert_eq!(page.items[14].member, "user:11");
    }

    #[tokio::test]
    async fn test_fetch_beyond_last_page_keeps_total() {
        let fetcher = PageFetcher::new(leaderboard(25).await);
        let page = fetcher
            .fetch("leaderboard", &PageQuery::new().page(3))
            .await
            .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.total, 25);
    }

    #[tokio::test]
    async fn test_empty_key_fails_before_store_call() {
        let fetcher = PageFetcher::new(leaderboard(3).await);
        let result = fetcher.fetch("", &PageQuery::new()).await;

        assert!(matches!(result, Err(PaginatorError::InvalidKey)));
        assert_eq!(fetcher.store().call_count(), 0);
    }
}
