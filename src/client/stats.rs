//! Periodic refresh of the dashboard counters.
//!
//! Stats are non-critical: a failed cycle is logged and skipped, the
//! displayed numbers stay as they were, and the next tick tries again. No
//! toast is ever shown from here.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::net::{HelpdeskApi, RequestHandle};
use crate::config::{ClientConfig, DEFAULT_STATS_INTERVAL_SECS};

/// Shortest accepted poll period. Shorter requests are raised to this.
pub const MIN_STATS_INTERVAL: Duration = Duration::from_secs(1);

/// Labeled counters on the dashboard.
pub trait StatsView: Send + Sync {
    /// False once the dashboard is no longer displayed.
    fn is_active(&self) -> bool;
    /// Update the counter labeled `key`. Returns false if no such counter exists.
    fn set_counter(&self, key: &str, value: u64) -> bool;
}

pub struct DashboardStatsPoller {
    api: Arc<dyn HelpdeskApi>,
    view: Arc<dyn StatsView>,
    interval: Duration,
    timeout: Option<Duration>,
    task: Option<JoinHandle<()>>,
}

impl DashboardStatsPoller {
    #[must_use]
    pub fn new(api: Arc<dyn HelpdeskApi>, view: Arc<dyn StatsView>) -> Self {
        Self {
            api,
            view,
            interval: Duration::from_secs(DEFAULT_STATS_INTERVAL_SECS),
            timeout: None,
            task: None,
        }
    }

    /// Poll period and request bound taken from `config`.
    #[must_use]
    pub fn from_config(config: &ClientConfig, api: Arc<dyn HelpdeskApi>, view: Arc<dyn StatsView>) -> Self {
        Self::new(api, view)
            .with_interval(config.stats_interval)
            .with_timeout(config.request_timeout)
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if interval < MIN_STATS_INTERVAL {
            warn!(?interval, min = ?MIN_STATS_INTERVAL, "stats interval too short; clamping");
        }
        self.interval = interval.max(MIN_STATS_INTERVAL);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Start polling. The first fetch happens one full interval from now,
    /// since the page was rendered with fresh counters. Returns false if
    /// already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        let api = Arc::clone(&self.api);
        let view = Arc::clone(&self.view);
        let (interval, timeout) = (self.interval, self.timeout);
        let first_tick = Instant::now() + interval;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !view.is_active() {
                    debug!("dashboard inactive; skipping stats refresh");
                    continue;
                }
                refresh_once(&api, view.as_ref(), timeout).await;
            }
        }));
        true
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for DashboardStatsPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fetch once and write every returned counter into `view`.
///
/// Returns how many counters were updated, or `None` if the fetch failed.
pub async fn refresh_once(api: &Arc<dyn HelpdeskApi>, view: &dyn StatsView, timeout: Option<Duration>) -> Option<usize> {
    let api = Arc::clone(api);
    let fetched = RequestHandle::spawn(async move { api.fetch_stats().await })
        .with_timeout(timeout)
        .wait()
        .await;

    let stats = match fetched {
        Ok(stats) => stats,
        Err(e) => {
            warn!(code = e.error_code(), error = %e, "dashboard stats refresh failed");
            return None;
        }
    };

    let mut updated = 0;
    for (key, value) in stats.iter() {
        if view.set_counter(key, value) {
            updated += 1;
        } else {
            debug!(key, "no counter element for stat");
        }
    }
    Some(updated)
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
