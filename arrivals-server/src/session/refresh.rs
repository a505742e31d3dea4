//! Platform refresh orchestration.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};

use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::aggregate::{fetch_report, merge_arrivals};
use crate::directory::StationDirectory;
use crate::domain::{PlatformId, StationId};
use crate::upstream::ArrivalSource;

use super::state::{PlatformSnapshot, PublishedArrivals};

/// How a refresh ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A list was published.
    Ready {
        /// Arrivals in the published list.
        arrivals: usize,
        /// Stations skipped because their fetch failed.
        failed_stations: Vec<StationId>,
    },
    /// The refresh failed; the error flag is set and the previous list kept.
    Errored,
}

/// Fetches, merges and publishes arrivals per platform.
///
/// Refreshes of the same platform run one at a time, so a slow refresh can
/// never overwrite the result of one that started after it. Different
/// platforms refresh independently.
pub struct ArrivalSession<S> {
    source: S,
    directory: StationDirectory,
    published: PublishedArrivals,
    locks: StdMutex<HashMap<PlatformId, Arc<Mutex<()>>>>,
}

impl<S: ArrivalSource> ArrivalSession<S> {
    /// Create a session publishing into a fresh state container.
    pub fn new(source: S, directory: StationDirectory) -> Self {
        Self::with_published(source, directory, PublishedArrivals::new())
    }

    /// Create a session publishing into an existing state container.
    pub fn with_published(
        source: S,
        directory: StationDirectory,
        published: PublishedArrivals,
    ) -> Self {
        Self {
            source,
            directory,
            published,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Refresh a platform using the stations the directory lists for it.
    ///
    /// A platform with no stations publishes an empty list.
    pub async fn refresh(&self, platform: &PlatformId) -> RefreshOutcome {
        let stations = self.directory.stations(platform).to_vec();
        self.refresh_with(platform, &stations).await
    }

    /// Refresh a platform from an explicit station list.
    ///
    /// Never fails outright: station failures are skipped, and anything
    /// that goes wrong beyond that sets the platform's error flag.
    pub async fn refresh_with(&self, platform: &PlatformId, stations: &[StationId]) -> RefreshOutcome {
        // Declared before the guard so the guard is released first.
        let lease = self.platform_lease(platform);
        let _guard = lease.lock.lock().await;
        self.run_refresh(platform, stations).await
    }

    async fn run_refresh(&self, platform: &PlatformId, stations: &[StationId]) -> RefreshOutcome {
        self.published.begin_refresh(platform);
        let mut in_flight = InFlight {
            published: &self.published,
            platform,
            finished: false,
        };

        let pipeline = async {
            let report = fetch_report(&self.source, stations).await;
            let ranked = merge_arrivals(report.arrivals);
            (ranked, report.batch_time, report.failed)
        };

        match AssertUnwindSafe(pipeline).catch_unwind().await {
            Ok((ranked, batch_time, failed)) => {
                let count = ranked.len();
                if !failed.is_empty() && failed.len() == stations.len() {
                    warn!(platform = %platform, stations = stations.len(), "every station failed");
                }
                info!(
                    platform = %platform,
                    arrivals = count,
                    failed_stations = failed.len(),
                    "published arrivals"
                );
                self.published.publish(platform, ranked, batch_time);
                in_flight.finished = true;
                RefreshOutcome::Ready {
                    arrivals: count,
                    failed_stations: failed,
                }
            }
            Err(panic) => {
                error!(
                    platform = %platform,
                    reason = panic_message(panic.as_ref()),
                    "refresh failed, keeping previous arrivals"
                );
                self.published.mark_failed(platform);
                in_flight.finished = true;
                RefreshOutcome::Errored
            }
        }
    }

    /// Remove the platform's published list.
    pub fn clear(&self, platform: &PlatformId) {
        if self.published.remove(platform) {
            info!(platform = %platform, "cleared arrivals");
        }
    }

    /// Read one platform's state.
    pub fn snapshot(&self, platform: &PlatformId) -> PlatformSnapshot {
        self.published.snapshot(platform)
    }

    /// The published state this session writes to.
    pub fn published(&self) -> &PublishedArrivals {
        &self.published
    }

    pub fn directory(&self) -> &StationDirectory {
        &self.directory
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn platform_lease(&self, platform: &PlatformId) -> PlatformLease<'_> {
        let lock = Arc::clone(self.lock_map().entry(platform.clone()).or_default());
        PlatformLease {
            locks: &self.locks,
            platform: platform.clone(),
            lock,
        }
    }

    fn lock_map(&self) -> StdMutexGuard<'_, HashMap<PlatformId, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A platform's refresh lock, checked out of the lock map.
///
/// Dropping the lease removes the lock from the map once nobody else holds
/// or waits on it, so the map doesn't grow with every platform name ever
/// requested. Runs on cancellation too.
struct PlatformLease<'a> {
    locks: &'a StdMutex<HashMap<PlatformId, Arc<Mutex<()>>>>,
    platform: PlatformId,
    lock: Arc<Mutex<()>>,
}

impl Drop for PlatformLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference in the map, one here.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.platform);
        }
    }
}

/// Clears the loading flag if a refresh is dropped before it finishes.
struct InFlight<'a> {
    published: &'a PublishedArrivals,
    platform: &'a PlatformId,
    finished: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(platform = %self.platform, "refresh cancelled, keeping previous arrivals");
            self.published.set_loading(self.platform, false);
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
