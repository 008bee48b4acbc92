use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use analysis::ActivityReport;
use lru::LruCache;
use tokio::sync::Mutex;

#[derive(Clone, Debug)]
struct CachedReport {
    report: Arc<ActivityReport>,
    stored_at: Instant,
}

impl CachedReport {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Recently computed reports keyed by user and window, so the results page
/// and the export links that follow it share one fetch.
#[derive(Clone)]
pub struct ReportCache {
    inner: Arc<Mutex<LruCache<String, CachedReport>>>,
    ttl: Duration,
}

impl ReportCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(capacity))),
            ttl,
        }
    }

    pub fn key(username: &str, window: &str) -> String {
        format!("{}|{}", username.trim().to_ascii_lowercase(), window)
    }

    pub async fn get(&self, key: &str) -> Option<Arc<ActivityReport>> {
        let mut guard = self.inner.lock().await;
        let fresh = guard
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.report.clone());
        if fresh.is_none() {
            guard.pop(key);
        }
        fresh
    }

    pub async fn put(&self, key: String, report: Arc<ActivityReport>) {
        let mut guard = self.inner.lock().await;
        guard.put(
            key,
            CachedReport {
                report,
                stored_at: Instant::now(),
            },
        );
    }
}
