//! Sorted set paginator facade
//!
//! Combines [`PageFetcher`], [`RankLocator`] and the configured page links
//! behind one store handle.

use crate::config::{PageQuery, PaginatorConfig};
use crate::envelope::{LengthAwarePage, PageLinks};
use crate::error::PaginatorResult;
use crate::fetcher::PageFetcher;
use crate::locator::{MemberRank, RankLocator};
use crate::resolver::ResultResolver;
use crate::store::{RedisSortedSetStore, ScoredMember, SortedSetStore};
use std::sync::Arc;

pub struct SortedSetPaginator<S> {
    fetcher: PageFetcher<Arc<S>>,
    locator: RankLocator<Arc<S>>,
    links: PageLinks,
    config: PaginatorConfig,
}

impl SortedSetPaginator<RedisSortedSetStore> {
    /// Connect to Redis; the configured command timeout also bounds the handshake
    pub async fn connect(redis_url: &str, config: PaginatorConfig) -> PaginatorResult<Self> {
        let store =
            RedisSortedSetStore::connect_with_timeout(redis_url, config.command_timeout).await?;
        Ok(Self::new(store, config))
    }
}

impl<S: SortedSetStore> SortedSetPaginator<S> {
    pub fn new(store: S, config: PaginatorConfig) -> Self {
        let store = Arc::new(store);
        Self {
            fetcher: PageFetcher::new(Arc::clone(&store)),
            locator: RankLocator::new(store),
            links: PageLinks::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &PaginatorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.fetcher.store()
    }

    /// A query seeded with the configured page size
    pub fn query(&self) -> PageQuery {
        PageQuery::from_config(&self.config)
    }

    /// Load a page of raw members. `page` overrides the query's page.
    pub async fn paginate(
        &self,
        key: &str,
        query: &PageQuery,
        page: Option<u32>,
    ) -> PaginatorResult<LengthAwarePage<ScoredMember>> {
        let query = Self::with_page(query, page);
        let page = self.fetcher.fetch(key, &query).await?;
        Ok(LengthAwarePage::new(page, self.links.clone()))
    }

    /// Load a page and resolve its members into records
    pub async fn paginate_resolved<R>(
        &self,
        key: &str,
        query: &PageQuery,
        page: Option<u32>,
        resolver: &R,
    ) -> PaginatorResult<LengthAwarePage<R::Record>>
    where
        R: ResultResolver + ?Sized,
    {
        let query = Self::with_page(query, page);
        let page = self.fetcher.fetch_resolved(key, &query, resolver).await?;
        Ok(LengthAwarePage::new(page, self.links.clone()))
    }

    /// Rank, score and page of `member`, or `None` if it is not in the set
    pub async fn rank(
        &self,
        key: &str,
        member: &str,
        query: &PageQuery,
    ) -> PaginatorResult<Option<MemberRank>> {
        self.locator.locate(key, member, query).await
    }

    fn with_page(query: &PageQuery, page: Option<u32>) -> PageQuery {
        match page {
            Some(page) => query.page(page),
            None => *query,
        }
    }
}
