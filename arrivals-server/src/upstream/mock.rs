//! Mock arrival source for development and testing without the live API.
//!
//! Serves canned boards held in memory, optionally loaded from a directory
//! of JSON files, and records every station it is asked for.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::domain::StationId;

use super::error::UpstreamError;
use super::source::ArrivalSource;
use super::types::ArrivalsResponse;

/// What the mock does when asked for a station.
#[derive(Debug, Clone)]
pub enum MockBoard {
    /// Return this board.
    Board(Arc<ArrivalsResponse>),
    /// Fail as if the API returned `status`.
    Fail { status: u16 },
    /// Panic mid-fetch. Used to exercise the session's failure boundary.
    Panic,
}

#[derive(Default)]
struct MockInner {
    boards: RwLock<HashMap<StationId, MockBoard>>,
    delay: RwLock<Option<Duration>>,
    requests: Mutex<Vec<StationId>>,
}

/// Arrival source that serves pre-configured boards.
#[derive(Clone, Default)]
pub struct MockArrivalSource {
    inner: Arc<MockInner>,
}

impl MockArrivalSource {
    /// Create an empty mock. Every station is unknown until configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock by loading JSON files from a directory.
    ///
    /// Expects files named `{station}.json` (e.g. `20623.json`), each
    /// holding an upstream response body.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, UpstreamError> {
        let data_dir = data_dir.as_ref();
        let mut boards = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            UpstreamError::NotConfigured(format!("failed to read mock data directory: {e}"))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| {
                    UpstreamError::NotConfigured(format!("failed to read directory entry: {e}"))
                })?
                .path();

            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let station = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| StationId::parse(s).ok())
                .ok_or_else(|| {
                    UpstreamError::NotConfigured(format!("invalid station filename: {path:?}"))
                })?;

            let json = std::fs::read_to_string(&path).map_err(|e| {
                UpstreamError::NotConfigured(format!("failed to read {path:?}: {e}"))
            })?;

            let board: ArrivalsResponse =
                serde_json::from_str(&json).map_err(|e| UpstreamError::Json {
                    message: format!("failed to parse {path:?}: {e}"),
                    body: None,
                })?;

            boards.insert(station, MockBoard::Board(Arc::new(board)));
        }

        if boards.is_empty() {
            return Err(UpstreamError::NotConfigured(format!(
                "no mock board files found in {data_dir:?}"
            )));
        }

        Ok(Self {
            inner: Arc::new(MockInner {
                boards: RwLock::new(boards),
                ..Default::default()
            }),
        })
    }

    /// Serve `board` for `station`.
    pub async fn set_board(&self, station: StationId, board: ArrivalsResponse) {
        self.set(station, MockBoard::Board(Arc::new(board))).await;
    }

    /// Make `station` fail with the given HTTP status.
    pub async fn set_failure(&self, station: StationId, status: u16) {
        self.set(station, MockBoard::Fail { status }).await;
    }

    /// Make fetching `station` panic.
    pub async fn set_panic(&self, station: StationId) {
        self.set(station, MockBoard::Panic).await;
    }

    async fn set(&self, station: StationId, board: MockBoard) {
        self.inner.boards.write().await.insert(station, board);
    }

    /// Delay every subsequent response by `delay`.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.inner.delay.write().await = delay;
    }

    /// Stations requested so far, in request order.
    pub async fn requests(&self) -> Vec<StationId> {
        self.inner.requests.lock().await.clone()
    }

    /// Stations with configured boards, sorted.
    pub async fn available_stations(&self) -> Vec<StationId> {
        let mut stations: Vec<_> = self.inner.boards.read().await.keys().cloned().collect();
        stations.sort();
        stations
    }
}

impl ArrivalSource for MockArrivalSource {
    async fn fetch_station(
        &self,
        station: &StationId,
    ) -> Result<Arc<ArrivalsResponse>, UpstreamError> {
        self.inner.requests.lock().await.push(station.clone());

        // Read the board before sleeping so a slow request keeps serving the
        // data that was current when it started.
        let board = self.inner.boards.read().await.get(station).cloned();
        let delay = *self.inner.delay.read().await;

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match board {
            Some(MockBoard::Board(board)) => Ok(board),
            Some(MockBoard::Fail { status }) => Err(UpstreamError::Api {
                status,
                message: "mock failure".to_string(),
            }),
            Some(MockBoard::Panic) => panic!("mock source panicked for station {station}"),
            None => Err(UpstreamError::NotFound {
                station: station.to_string(),
            }),
        }
    }
}
