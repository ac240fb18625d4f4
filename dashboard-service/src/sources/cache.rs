use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;
use usage_core::RawTable;

use super::TableSource;
use crate::error::DashboardError;

struct Snapshot {
    table: Arc<RawTable>,
    fetched_at: Instant,
}

/// Read-through cache holding the last fetched table.
///
/// A snapshot is served until it is older than `ttl` or until
/// [`SnapshotCache::invalidate`] is called. The lock is held while fetching so
/// concurrent requests share one download. A failed fetch leaves the cache
/// empty and is reported to the caller.
pub struct SnapshotCache {
    source: Arc<dyn TableSource>,
    ttl: Duration,
    snapshot: Mutex<Option<Snapshot>>,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn TableSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            snapshot: Mutex::new(None),
        }
    }

    pub async fn get(&self) -> Result<Arc<RawTable>, DashboardError> {
        let mut guard = self.snapshot.lock().await;

        if let Some(snap) = guard.as_ref() {
            if snap.fetched_at.elapsed() < self.ttl {
                metrics::counter!("snapshot_cache_hits_total").increment(1);
                return Ok(Arc::clone(&snap.table));
            }
        }

        metrics::counter!("source_fetch_total").increment(1);
        let started = Instant::now();
        let table = match self.source.load().await {
            Ok(t) => Arc::new(t),
            Err(e) => {
                metrics::counter!("source_fetch_failed_total").increment(1);
                tracing::error!(
                    error = %e,
                    source = %self.source.describe(),
                    "source fetch failed"
                );
                *guard = None;
                return Err(e);
            }
        };

        metrics::histogram!("source_fetch_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(
            rows = table.rows.len(),
            columns = table.headers.len(),
            source = %self.source.describe(),
            "source snapshot refreshed"
        );

        *guard = Some(Snapshot {
            table: Arc::clone(&table),
            fetched_at: Instant::now(),
        });
        Ok(table)
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }

    pub async fn invalidate(&self) {
        *self.snapshot.lock().await = None;
        tracing::info!("source snapshot invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl TableSource for CountingSource {
        async fn load(&self) -> Result<RawTable, DashboardError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DashboardError::Fetch("boom".into()));
            }
            Ok(RawTable::new(vec!["Tanggal".into()], Vec::new()))
        }

        fn describe(&self) -> String {
            "counting".into()
        }
    }

    #[tokio::test]
    async fn serves_snapshot_within_ttl() {
        let source = Arc::new(CountingSource::default());
        let cache = SnapshotCache::new(source.clone(), Duration::from_secs(3600));

        cache.get().await.unwrap();
        cache.get().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let source = Arc::new(CountingSource::default());
        let cache = SnapshotCache::new(source.clone(), Duration::from_secs(3600));

        cache.get().await.unwrap();
        cache.invalidate().await;
        cache.get().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_ttl_always_refetches() {
        let source = Arc::new(CountingSource::default());
        let cache = SnapshotCache::new(source.clone(), Duration::ZERO);

        cache.get().await.unwrap();
        cache.get().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let source = Arc::new(CountingSource {
            fail: true,
            ..Default::default()
        });
        let cache = SnapshotCache::new(source.clone(), Duration::from_secs(3600));

        assert!(cache.get().await.is_err());
        assert!(cache.get().await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
