//! Paginator metrics for observability

use prometheus::{CounterVec, IntCounter, Opts, Registry};
use std::sync::OnceLock;

static METRICS: OnceLock<PaginatorMetricsInner> = OnceLock::new();

struct PaginatorMetricsInner {
    pages_fetched: CounterVec,
    rank_lookups: CounterVec,
    resolver_dropped: IntCounter,
    store_errors: CounterVec,
}

impl PaginatorMetricsInner {
    fn new() -> Self {
        Self {
            pages_fetched: CounterVec::new(
                Opts::new(
                    "zset_paginator_pages_fetched_total",
                    "Total sorted set pages fetched",
                ),
                &["direction"],
            )
            .expect("valid metric definition"),
            rank_lookups: CounterVec::new(
                Opts::new(
                    "zset_paginator_rank_lookups_total",
                    "Total member rank lookups",
                ),
                &["outcome"],
            )
            .expect("valid metric definition"),
            resolver_dropped: IntCounter::new(
                "zset_paginator_resolver_dropped_total",
                "Total set members dropped because no record resolved",
            )
            .expect("valid metric definition"),
            store_errors: CounterVec::new(
                Opts::new(
                    "zset_paginator_store_errors_total",
                    "Total sorted set store errors",
                ),
                &["operation"],
            )
            .expect("valid metric definition"),
        }
    }

    fn register(&self, registry: &Registry) -> Result<(), prometheus::Error> {
        registry.register(Box::new(self.pages_fetched.clone()))?;
        registry.register(Box::new(self.rank_lookups.clone()))?;
        registry.register(Box::new(self.resolver_dropped.clone()))?;
        registry.register(Box::new(self.store_errors.clone()))?;
        Ok(())
    }
}

fn get_metrics() -> &'static PaginatorMetricsInner {
    METRICS.get_or_init(PaginatorMetricsInner::new)
}

/// Paginator metrics wrapper
#[derive(Clone, Debug, Default)]
pub struct PaginatorMetrics;

impl PaginatorMetrics {
    pub fn new() -> Self {
        Self
    }

    /// Register metrics with a Prometheus registry
    pub fn register(registry: &Registry) -> Result<(), prometheus::Error> {
        get_metrics().register(registry)
    }

    pub fn record_page(&self, direction: &str) {
        get_metrics()
            .pages_fetched
            .with_label_values(&[direction])
            .inc();
    }

    pub fn record_rank_found(&self) {
        get_metrics().rank_lookups.with_label_values(&["found"]).inc();
    }

    pub fn record_rank_missing(&self) {
        get_metrics()
            .rank_lookups
            .with_label_values(&["missing"])
            .inc();
    }

    pub fn record_dropped(&self, count: usize) {
        get_metrics().resolver_dropped.inc_by(count as u64);
    }

    pub fn record_store_error(&self, operation: &str) {
        get_metrics()
            .store_errors
            .with_label_values(&[operation])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_exposes_counters() {
        let registry = Registry::new();
        PaginatorMetrics::register(&registry).unwrap();

        let metrics = PaginatorMetrics::new();
        metrics.record_page("asc");
        metrics.record_rank_missing();
        metrics.record_dropped(2);

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"zset_paginator_pages_fetched_total".to_string()));
        assert!(names.contains(&"zset_paginator_rank_lookups_total".to_string()));
        assert!(names.contains(&"zset_paginator_resolver_dropped_total".to_string()));
    }
}
