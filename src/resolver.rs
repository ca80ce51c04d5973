//! Resolution of raw set members into external records
//!
//! A resolver turns a page of `(member, score)` pairs into the records those
//! members stand for, with each record carrying its member's score. Set order
//! is always preserved. Members whose key cannot be derived, or whose record
//! does not come back from the lookup, are dropped from the output.
//!
//! Two record shapes are supported through [`ScoredRecord`]:
//! - Rich records implement the trait and store the score in a field
//! - JSON-style maps get the score merged in under the score field

use crate::error::PaginatorResult;
use crate::store::ScoredMember;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

/// Field used to match records to lookup keys unless a resolver overrides it
pub const DEFAULT_KEY_FIELD: &str = "id";

/// Field the score is stored under unless a resolver overrides it
pub const DEFAULT_SCORE_FIELD: &str = "score";

/// Capability a record needs to be matched and scored
pub trait ScoredRecord<K> {
    /// Value of the record's key field, if present and of the right type
    fn record_key(&self, key_field: &str) -> Option<K>;

    /// Store `score` on the record under `score_field`
    fn attach_score(&mut self, score_field: &str, score: f64);
}

/// Map records keep an existing entry under the score field.
impl<K: DeserializeOwned> ScoredRecord<K> for Map<String, Value> {
    fn record_key(&self, key_field: &str) -> Option<K> {
        self.get(key_field)
            .and_then(|v| Deserialize::deserialize(v).ok())
    }

    fn attach_score(&mut self, score_field: &str, score: f64) {
        self.entry(score_field.to_string())
            .or_insert_with(|| Value::from(score));
    }
}

impl<K: DeserializeOwned> ScoredRecord<K> for HashMap<String, Value> {
    fn record_key(&self, key_field: &str) -> Option<K> {
        self.get(key_field)
            .and_then(|v| Deserialize::deserialize(v).ok())
    }

    fn attach_score(&mut self, score_field: &str, score: f64) {
        self.entry(score_field.to_string())
            .or_insert_with(|| Value::from(score));
    }
}

/// Maps sorted set members to externally stored records
#[async_trait]
pub trait ResultResolver: Send + Sync {
    /// Lookup key derived from a member
    type Key: Eq + Hash + Clone + Send + Sync;
    /// Record returned by the bulk lookup
    type Record: ScoredRecord<Self::Key> + Send;

    fn key_field(&self) -> &str {
        DEFAULT_KEY_FIELD
    }

    fn score_field(&self) -> &str {
        DEFAULT_SCORE_FIELD
    }

    /// Derive the lookup key for `member`; `None` drops the member
    fn resolve_key(&self, member: &str) -> Option<Self::Key>;

    /// Load the records for `keys` in any order. Missing keys are not an error.
    async fn resolve_models(&self, keys: &[Self::Key]) -> PaginatorResult<Vec<Self::Record>>;
}

/// Two-way member/key mapping for a single resolve call
#[derive(Debug, Clone)]
pub struct KeyMapping<K> {
    member_to_key: HashMap<String, K>,
    key_to_member: HashMap<K, String>,
    keys: Vec<K>,
}

impl<K: Eq + Hash + Clone> KeyMapping<K> {
    /// Derive keys for `members` in order. When two members share a key the
    /// later member owns it.
    pub fn build<F>(members: &[ScoredMember], mut resolve_key: F) -> Self
    where
        F: FnMut(&str) -> Option<K>,
    {
        let mut member_to_key = HashMap::with_capacity(members.len());
        let mut key_to_member = HashMap::with_capacity(members.len());
        let mut keys = Vec::with_capacity(members.len());

        for scored in members {
            let Some(key) = resolve_key(&scored.member) else {
                continue;
            };

            if key_to_member
                .insert(key.clone(), scored.member.clone())
                .is_none()
            {
                keys.push(key.clone());
            }
            member_to_key.insert(scored.member.clone(), key);
        }

        Self {
            member_to_key,
            key_to_member,
            keys,
        }
    }

    /// Distinct keys in first-seen order
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn key_for(&self, member: &str) -> Option<&K> {
        self.member_to_key.get(member)
    }

    /// Member that owns `key`
    pub fn member_for(&self, key: &K) -> Option<&str> {
        self.key_to_member.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Attach scores to `records`, emitting them in the order of `members`.
///
/// A member is skipped when it has no key, when a later member took over its
/// key, or when no record carries its key.
pub fn attach_scores<K, T>(
    members: &[ScoredMember],
    mapping: &KeyMapping<K>,
    records: Vec<T>,
    key_field: &str,
    score_field: &str,
) -> Vec<T>
where
    K: Eq + Hash + Clone,
    T: ScoredRecord<K>,
{
    let mut index: HashMap<K, T> = HashMap::with_capacity(records.len());
    for record in records {
        if let Some(key) = record.record_key(key_field) {
            index.insert(key, record);
        }
    }

    let mut resolved = Vec::with_capacity(members.len());
    for scored in members {
        let Some(key) = mapping.key_for(&scored.member) else {
            continue;
        };
        if mapping.member_for(key) != Some(scored.member.as_str()) {
            continue;
        }
        let Some(mut record) = index.remove(key) else {
            continue;
        };

        record.attach_score(score_field, scored.score);
        resolved.push(record);
    }

    resolved
}

/// Resolve a page of members through `resolver`.
///
/// Empty input returns immediately without deriving keys or calling the
/// bulk lookup.
pub async fn resolve<R>(
    resolver: &R,
    members: &[ScoredMember],
) -> PaginatorResult<Vec<R::Record>>
where
    R: ResultResolver + ?Sized,
{
    if members.is_empty() {
        return Ok(Vec::new());
    }

    let mapping = KeyMapping::build(members, |member| resolver.resolve_key(member));
    if mapping.is_empty() {
        debug!(requested = members.len(), "No lookup keys derived from members");
        return Ok(Vec::new());
    }

    let records = resolver.resolve_models(mapping.keys()).await?;
    let resolved = attach_scores(
        members,
        &mapping,
        records,
        resolver.key_field(),
        resolver.score_field(),
    );

    debug!(
        requested = members.len(),
        resolved = resolved.len(),
        "Sorted set members resolved"
    );
    Ok(resolved)
}

/// Deserialize map records into typed values after resolution
pub fn into_typed<T: DeserializeOwned>(
    records: Vec<Map<String, Value>>,
) -> serde_json::Result<Vec<T>> {
    records
        .into_iter()
        .map(|record| serde_json::from_value(Value::Object(record)))
        .collect()
}
