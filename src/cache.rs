use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::spaceflightnow::Launch;

/// Most recent successful scrape, shared between the refresh task (the only
/// writer) and request handlers.
///
/// The launch list is replaced as a whole `Arc`, so readers hold either the
/// old or the new snapshot and never a partially updated one.
pub struct LaunchCache {
    launches: RwLock<Arc<Vec<Launch>>>,
    last_refresh: RwLock<Option<DateTime<Utc>>>,
    interval: Duration,
}

impl LaunchCache {
    pub fn new(interval: Duration) -> Self {
        Self {
            launches: RwLock::new(Arc::new(Vec::new())),
            last_refresh: RwLock::new(None),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn current(&self) -> Arc<Vec<Launch>> {
        self.launches.read().await.clone()
    }

    /// Start time of the most recent refresh attempt, successful or not.
    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.read().await
    }

    pub async fn time_until_next_refresh(&self) -> Duration {
        self.time_until_next_refresh_at(Utc::now()).await
    }

    /// `max(0, last_refresh + interval - now)`; zero before the first attempt.
    pub async fn time_until_next_refresh_at(&self, now: DateTime<Utc>) -> Duration {
        let Some(last_refresh) = self.last_refresh().await else {
            return Duration::ZERO;
        };

        let Ok(interval) = chrono::Duration::from_std(self.interval) else {
            return self.interval;
        };

        (last_refresh + interval - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    pub(crate) async fn mark_refresh(&self, at: DateTime<Utc>) {
        *self.last_refresh.write().await = Some(at);
    }

    pub(crate) async fn publish(&self, launches: Vec<Launch>) {
        let snapshot = Arc::new(launches);
        *self.launches.write().await = snapshot;
    }
}
