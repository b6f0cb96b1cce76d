use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{self, MissedTickBehavior};

use crate::cache::LaunchCache;
use crate::error::FetchError;
use crate::ready::ReadyNotifier;
use crate::spaceflightnow::Launch;

/// Runs one refresh cycle: stamps the attempt time, scrapes, and publishes on
/// success. A failed scrape keeps the previous launches.
///
/// Returns whether the scrape succeeded.
pub async fn refresh_once<F, Fut>(
    cache: &LaunchCache,
    notifier: &mut ReadyNotifier,
    scrape: F,
) -> bool
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Launch>, FetchError>>,
{
    log::info!("Fetching launches...");
    cache.mark_refresh(Utc::now()).await;

    match scrape().await {
        Ok(launches) => {
            let count = launches.len();
            cache.publish(launches).await;
            log::info!("Launches updated successfully ({count} at tracked sites).");
            if notifier.notify() {
                log::info!("Initial launch data is ready");
            }
            true
        }
        Err(err) => {
            log::warn!("Failed to fetch launches: {err}. Keeping previous data.");
            if !notifier.has_fired() {
                log::warn!("No launch data loaded yet, waiting for the next refresh");
            }
            false
        }
    }
}

/// Refreshes immediately and then once per `cache.interval()`, forever.
pub async fn refresh_periodically<F, Fut>(
    cache: Arc<LaunchCache>,
    mut notifier: ReadyNotifier,
    mut scrape: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<Launch>, FetchError>>,
{
    let mut ticker = time::interval(cache.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        refresh_once(&cache, &mut notifier, &mut scrape).await;
    }
}
