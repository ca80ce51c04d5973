use super::{RankAndScore, RankRange, ScoredMember, SortedSetStore};
use crate::config::SortDirection;
use crate::error::PaginatorResult;
use crate::key::SortedSetKey;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tokio::sync::RwLock;

/// In-process sorted set store.
///
/// Members are ordered the way Redis orders them: by score, then by member
/// bytes. Descending reads are the exact reverse of ascending reads.
#[derive(Default)]
pub struct MemorySortedSetStore {
    sets: RwLock<HashMap<String, Vec<ScoredMember>>>,
    calls: AtomicUsize,
}

fn store_order(a: &ScoredMember, b: &ScoredMember) -> Ordering {
    a.score
        .total_cmp(&b.score)
        .then_with(|| a.member.as_bytes().cmp(b.member.as_bytes()))
}

impl MemorySortedSetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update `member`. Returns `true` when the member is new.
    /// NaN scores are rejected and leave the set untouched.
    pub async fn zadd(&self, key: &str, member: &str, score: f64) -> bool {
        if score.is_nan() {
            return false;
        }

        let mut sets = self.sets.write().await;
        let set = sets.entry(key.to_string()).or_default();

        let existing = set.iter().position(|m| m.member == member);
        if let Some(idx) = existing {
            set.remove(idx);
        }
        set.push(ScoredMember::new(member, score));
        set.sort_by(store_order);

        existing.is_none()
    }

    /// Remove `member`. Returns `true` when it was present.
    pub async fn zrem(&self, key: &str, member: &str) -> bool {
        let mut sets = self.sets.write().await;
        let Some(set) = sets.get_mut(key) else {
            return false;
        };

        let before = set.len();
        set.retain(|m| m.member != member);
        let removed = set.len() != before;

        if set.is_empty() {
            sets.remove(key);
        }
        removed
    }

    /// Drop a whole set
    pub async fn del(&self, key: &str) {
        self.sets.write().await.remove(key);
    }

    /// Number of store reads served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

#[async_trait]
impl SortedSetStore for MemorySortedSetStore {
    async fn range_by_rank(
        &self,
        key: &SortedSetKey,
        range: RankRange,
        direction: SortDirection,
    ) -> PaginatorResult<Vec<ScoredMember>> {
        self.record_call();
        let sets = self.sets.read().await;
        let Some(set) = sets.get(key.as_str()) else {
            return Ok(Vec::new());
        };

        let start = usize::try_from(range.start).unwrap_or(usize::MAX);
        let take = usize::try_from(range.count()).unwrap_or(usize::MAX);

        let members: Vec<ScoredMember> = match direction {
            SortDirection::Asc => set.iter().skip(start).take(take).cloned().collect(),
            SortDirection::Desc => set.iter().rev().skip(start).take(take).cloned().collect(),
        };
        Ok(members)
    }

    async fn cardinality(&self, key: &SortedSetKey) -> PaginatorResult<u64> {
        self.record_call();
        let sets = self.sets.read().await;
        Ok(sets.get(key.as_str()).map_or(0, |set| set.len() as u64))
    }

    async fn rank_and_score(
        &self,
        key: &SortedSetKey,
        member: &str,
        direction: SortDirection,
    ) -> PaginatorResult<RankAndScore> {
        self.record_call();
        // Single read guard: rank and score come from the same state of the set.
        let sets = self.sets.read().await;
        let Some(set) = sets.get(key.as_str()) else {
            return Ok(RankAndScore::default());
        };

        let Some(idx) = set.iter().position(|m| m.member == member) else {
            return Ok(RankAndScore::default());
        };

        let rank = match direction {
            SortDirection::Asc => idx,
            SortDirection::Desc => set.len() - 1 - idx,
        };

        Ok(RankAndScore {
            rank: Some(rank as u64),
            score: Some(set[idx].score),
        })
    }
}
