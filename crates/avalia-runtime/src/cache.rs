//! Memoized parse results.
//!
//! Retried or resubmitted jobs often come back with the exact same LLM
//! text. Parsing is deterministic, so a report can be reused whenever the
//! text and the requested criteria are identical.

use avalia_core::{AnalysisReport, CriterionRequest};
use moka::future::Cache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::config::CacheConfig;

/// Cache key for a parsed report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    response_hash: u64,
    requests_hash: u64,
}

impl CacheKey {
    /// Create a cache key from parser inputs.
    pub fn new(raw_text: &str, requested: &[CriterionRequest]) -> Self {
        Self {
            response_hash: hash_of(raw_text),
            requests_hash: hash_of(requested),
        }
    }
}

fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Report cache using moka.
pub struct ReportCache {
    cache: Cache<CacheKey, AnalysisReport>,
}

impl ReportCache {
    /// Create a new cache with the given limits.
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl)
    }

    pub async fn get(&self, key: &CacheKey) -> Option<AnalysisReport> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, report: AnalysisReport) {
        self.cache.insert(key, report).await;
    }

    /// Return the cached report or compute and store it.
    pub async fn get_or_parse<F>(&self, key: CacheKey, parse: F) -> AnalysisReport
    where
        F: FnOnce() -> AnalysisReport,
    {
        if let Some(report) = self.get(&key).await {
            tracing::debug!(?key, "Report cache hit");
            return report;
        }
        let report = parse();
        self.insert(key, report.clone()).await;
        report
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
