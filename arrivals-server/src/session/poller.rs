//! Periodic refresh of a fixed set of platforms.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::domain::PlatformId;
use crate::upstream::ArrivalSource;

use super::refresh::ArrivalSession;

/// Refresh `platforms` every `interval`, forever.
///
/// Platforms are refreshed one after another within a round. If a round
/// overruns the interval, the next one starts late rather than bunching up.
pub async fn poll_platforms<S>(
    session: Arc<ArrivalSession<S>>,
    platforms: Vec<PlatformId>,
    interval: Duration,
) where
    S: ArrivalSource + 'static,
{
    info!(platforms = platforms.len(), interval_secs = interval.as_secs(), "starting poller");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        for platform in &platforms {
            let outcome = session.refresh(platform).await;
            debug!(platform = %platform, ?outcome, "poll round");
        }
    }
}

/// Spawn [`poll_platforms`] on the runtime.
pub fn spawn_poller<S>(
    session: Arc<ArrivalSession<S>>,
    platforms: Vec<PlatformId>,
    interval: Duration,
) -> JoinHandle<()>
where
    S: ArrivalSource + 'static,
{
    tokio::spawn(poll_platforms(session, platforms, interval))
}
