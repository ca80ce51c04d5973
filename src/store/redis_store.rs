use super::{RankAndScore, RankRange, ScoredMember, SortedSetStore};
use crate::config::SortDirection;
use crate::error::{PaginatorError, PaginatorResult};
use crate::key::SortedSetKey;
use crate::metrics::PaginatorMetrics;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult, Script};
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Shared Redis connection manager
pub type SharedRedis = Arc<Mutex<ConnectionManager>>;

/// Reads rank (ARGV[1] is ZRANK or ZREVRANK) and score in one server-side step.
/// A missing member comes back as nil in the corresponding slot.
const RANK_AND_SCORE_LUA: &str = r#"
return {
    redis.call(ARGV[1], KEYS[1], ARGV[2]),
    redis.call('ZSCORE', KEYS[1], ARGV[2])
}
"#;

fn rank_and_score_script() -> &'static Script {
    static SCRIPT: OnceLock<Script> = OnceLock::new();
    SCRIPT.get_or_init(|| Script::new(RANK_AND_SCORE_LUA))
}

fn rank_command(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ZRANK",
        SortDirection::Desc => "ZREVRANK",
    }
}

/// Await `fut`, failing with [`PaginatorError::Timeout`] once `limit` elapses
async fn bounded<T, F>(limit: Option<Duration>, fut: F) -> PaginatorResult<T>
where
    F: Future<Output = RedisResult<T>>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(reply) => reply.map_err(PaginatorError::Redis),
            Err(_) => Err(PaginatorError::Timeout(limit)),
        },
        None => fut.await.map_err(PaginatorError::Redis),
    }
}

fn to_redis_index(rank: u64) -> isize {
    isize::try_from(rank).unwrap_or(isize::MAX)
}

/// Sorted set store backed by a Redis connection manager
#[derive(Clone)]
pub struct RedisSortedSetStore {
    redis: SharedRedis,
    command_timeout: Option<Duration>,
    metrics: PaginatorMetrics,
}

impl RedisSortedSetStore {
    pub fn new(redis: SharedRedis) -> Self {
        Self {
            redis,
            command_timeout: None,
            metrics: PaginatorMetrics::new(),
        }
    }

    /// Open a connection manager for `redis_url`
    pub async fn connect(redis_url: &str) -> PaginatorResult<Self> {
        Self::connect_with_timeout(redis_url, None).await
    }

    /// Open a connection manager, bounding the handshake and every later
    /// round trip by `timeout`
    pub async fn connect_with_timeout(
        redis_url: &str,
        timeout: Option<Duration>,
    ) -> PaginatorResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let metrics = PaginatorMetrics::new();

        let manager = match bounded(timeout, ConnectionManager::new(client)).await {
            Ok(manager) => manager,
            Err(e) => {
                warn!(error = %e, "Redis connection failed");
                metrics.record_store_error("connect");
                return Err(e);
            }
        };

        Ok(Self::new(Arc::new(Mutex::new(manager)))
            .with_command_timeout(timeout)
            .with_metrics(metrics))
    }

    /// Bound every round trip by `timeout`; `None` waits indefinitely
    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: PaginatorMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    async fn run<T, F>(
        &self,
        operation: &'static str,
        key: &SortedSetKey,
        fut: F,
    ) -> PaginatorResult<T>
    where
        F: Future<Output = RedisResult<T>> + Send,
    {
        let result = bounded(self.command_timeout, fut).await;

        if let Err(e) = &result {
            warn!(key = %key, operation, error = %e, "Sorted set store call failed");
            self.metrics.record_store_error(operation);
        }

        result
    }
}

#[async_trait]
impl SortedSetStore for RedisSortedSetStore {
    async fn range_by_rank(
        &self,
        key: &SortedSetKey,
        range: RankRange,
        direction: SortDirection,
    ) -> PaginatorResult<Vec<ScoredMember>> {
        let start = to_redis_index(range.start);
        let stop = to_redis_index(range.end);

        let mut conn = self.redis.lock().await;
        let pairs: Vec<(String, f64)> = match direction {
            SortDirection::Asc => {
                self.run(
                    "zrange",
                    key,
                    conn.zrange_withscores::<_, Vec<(String, f64)>>(key.as_str(), start, stop),
                )
                .await?
            }
            SortDirection::Desc => {
                self.run(
                    "zrevrange",
                    key,
                    conn.zrevrange_withscores::<_, Vec<(String, f64)>>(key.as_str(), start, stop),
                )
                .await?
            }
        };

        debug!(key = %key, start, stop, count = pairs.len(), "Sorted set range loaded");
        Ok(pairs.into_iter().map(ScoredMember::from).collect())
    }

    async fn cardinality(&self, key: &SortedSetKey) -> PaginatorResult<u64> {
        let mut conn = self.redis.lock().await;
        self.run("zcard", key, conn.zcard::<_, u64>(key.as_str())).await
    }

    async fn rank_and_score(
        &self,
        key: &SortedSetKey,
        member: &str,
        direction: SortDirection,
    ) -> PaginatorResult<RankAndScore> {
        let mut invocation = rank_and_score_script().key(key.as_str());
        invocation.arg(rank_command(direction)).arg(member);

        let mut conn = self.redis.lock().await;
        let (rank, score): (Option<i64>, Option<f64>) = self
            .run("rank_and_score", key, invocation.invoke_async(&mut *conn))
            .await?;

        Ok(RankAndScore {
            rank: rank.and_then(|r| u64::try_from(r).ok()),
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_command_follows_direction() {
        assert_eq!(rank_command(SortDirection::Asc), "ZRANK");
        assert_eq!(rank_command(SortDirection::Desc), "ZREVRANK");
    }

    #[test]
    fn test_script_reads_rank_and_score_on_one_key() {
        assert!(RANK_AND_SCORE_LUA.contains("redis.call(ARGV[1], KEYS[1], ARGV[2])"));
        assert!(RANK_AND_SCORE_LUA.contains("'ZSCORE', KEYS[1], ARGV[2]"));
    }

    #[tokio::test]
    async fn test_bounded_times_out_stalled_reply() {
        let limit = Duration::from_millis(20);
        let result = bounded(Some(limit), std::future::pending::<RedisResult<u64>>()).await;

        assert!(matches!(result, Err(PaginatorError::Timeout(d)) if d == limit));
    }

    #[tokio::test]
    async fn test_bounded_passes_reply_through() {
        let reply = bounded(Some(Duration::from_secs(1)), async { Ok::<u64, _>(25) }).await;
        assert_eq!(reply.unwrap(), 25);

        let reply = bounded(None, async { Ok::<u64, _>(3) }).await;
        assert_eq!(reply.unwrap(), 3);

        let err = bounded(None, async {
            Err::<u64, _>(redis::RedisError::from((redis::ErrorKind::IoError, "reset")))
        })
        .await;
        assert!(matches!(err, Err(PaginatorError::Redis(_))));
    }

    #[test]
    fn test_redis_index_saturates() {
        assert_eq!(to_redis_index(14), 14);
        assert_eq!(to_redis_index(u64::MAX), isize::MAX);
    }
}
