//! Caching layer for upstream arrivals responses.
//!
//! Most platforms share the same central stations, so refreshing several
//! platforms back-to-back would otherwise ask the upstream for the same
//! board repeatedly. Boards are cached per station for a short TTL; only
//! successful responses are cached.
//!
//! A cached board is served aged by the time it has spent in the cache, so
//! its predictions keep counting down between upstream fetches.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::StationId;
use crate::upstream::{ArrivalSource, ArrivalsResponse, UpstreamError};

/// A board and when it was fetched.
type BoardEntry = (Arc<ArrivalsResponse>, Instant);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached stations.
    pub max_capacity: u64,
}

impl CacheConfig {
    /// Create a config with the given TTL and default capacity.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10),
            max_capacity: 256,
        }
    }
}

/// Arrival source with per-station response caching.
///
/// Wraps any `ArrivalSource` and serves repeated requests for the same
/// station from memory until the TTL expires. A zero TTL disables caching
/// and every request goes straight to the wrapped source.
pub struct CachedArrivalSource<S> {
    source: S,
    boards: Option<MokaCache<StationId, BoardEntry>>,
}

impl<S: ArrivalSource> CachedArrivalSource<S> {
    /// Create a new cached source.
    pub fn new(source: S, config: &CacheConfig) -> Self {
        let boards = (!config.ttl.is_zero()).then(|| {
            MokaCache::builder()
                .time_to_live(config.ttl)
                .max_capacity(config.max_capacity)
                .build()
        });

        Self { source, boards }
    }

    /// Access the underlying source for operations that bypass the cache.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.boards.as_ref().map_or(0, |b| b.entry_count())
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        if let Some(boards) = &self.boards {
            boards.invalidate_all();
        }
    }
}

impl<S: ArrivalSource> ArrivalSource for CachedArrivalSource<S> {
    async fn fetch_station(
        &self,
        station: &StationId,
    ) -> Result<Arc<ArrivalsResponse>, UpstreamError> {
        let Some(boards) = &self.boards else {
            return self.source.fetch_station(station).await;
        };

        if let Some((board, fetched_at)) = boards.get(station).await {
            let age = fetched_at.elapsed();
            trace!(station = %station, age_ms = age.as_millis() as u64, "arrivals cache hit");
            return Ok(Arc::new(board.aged(age)));
        }

        let board = self.source.fetch_station(station).await?;
        boards
            .insert(station.clone(), (board.clone(), Instant::now()))
            .await;

        Ok(board)
    }
}
