//! Published arrival state.
//!
//! Everything consumers read lives here: per-platform arrival lists,
//! loading flags and error flags, plus the focused arrival and the subset
//! currently on screen. Each is held in a `watch` channel, so readers get a
//! consistent snapshot and can subscribe to changes.
//!
//! The three per-platform maps share one channel. Every update is a single
//! `send_modify`, so a reader never sees a loading flag cleared before the
//! list it belongs to, or a list half-replaced.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::domain::{Arrival, PlatformId};

/// A ranked list as published for one platform.
#[derive(Debug, Clone)]
pub struct PublishedList {
    /// Deduplicated arrivals, in display order.
    pub arrivals: Arc<Vec<Arrival>>,
    /// Batch time of the refresh that produced the list.
    pub batch_time: DateTime<Utc>,
}

/// Per-platform lists and flags.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    lists: HashMap<PlatformId, PublishedList>,
    loading: HashMap<PlatformId, bool>,
    errors: HashMap<PlatformId, bool>,
}

impl BoardState {
    /// The published list, or `None` if nothing is published (never
    /// refreshed, or cleared).
    pub fn list(&self, platform: &PlatformId) -> Option<&PublishedList> {
        self.lists.get(platform)
    }

    pub fn is_loading(&self, platform: &PlatformId) -> bool {
        self.loading.get(platform).copied().unwrap_or(false)
    }

    pub fn has_error(&self, platform: &PlatformId) -> bool {
        self.errors.get(platform).copied().unwrap_or(false)
    }

    /// Platforms with a published list, sorted.
    pub fn published_platforms(&self) -> Vec<&PlatformId> {
        let mut platforms: Vec<_> = self.lists.keys().collect();
        platforms.sort();
        platforms
    }

    /// Everything known about one platform.
    pub fn snapshot(&self, platform: &PlatformId) -> PlatformSnapshot {
        let list = self.list(platform);
        PlatformSnapshot {
            platform: platform.clone(),
            arrivals: list.map(|l| Arc::clone(&l.arrivals)),
            updated_at: list.map(|l| l.batch_time),
            loading: self.is_loading(platform),
            error: self.has_error(platform),
        }
    }
}

/// Point-in-time view of one platform.
#[derive(Debug, Clone)]
pub struct PlatformSnapshot {
    pub platform: PlatformId,
    /// `None` means nothing is published; `Some(empty)` means the last
    /// refresh found no arrivals.
    pub arrivals: Option<Arc<Vec<Arrival>>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub loading: bool,
    pub error: bool,
}

struct Inner {
    boards: watch::Sender<BoardState>,
    focused: watch::Sender<Option<Arrival>>,
    displayed: watch::Sender<Arc<Vec<Arrival>>>,
}

/// Shared handle to the published state.
///
/// Cheap to clone; all clones see the same state.
#[derive(Clone)]
pub struct PublishedArrivals {
    inner: Arc<Inner>,
}

impl Default for PublishedArrivals {
    fn default() -> Self {
        Self::new()
    }
}

impl PublishedArrivals {
    pub fn new() -> Self {
        let (boards, _) = watch::channel(BoardState::default());
        let (focused, _) = watch::channel(None);
        let (displayed, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            inner: Arc::new(Inner {
                boards,
                focused,
                displayed,
            }),
        }
    }

    /// Mark a refresh as started: loading on, error off.
    pub fn begin_refresh(&self, platform: &PlatformId) {
        self.inner.boards.send_modify(|state| {
            state.loading.insert(platform.clone(), true);
            state.errors.insert(platform.clone(), false);
        });
    }

    /// Replace the platform's list and finish its refresh successfully.
    pub fn publish(&self, platform: &PlatformId, arrivals: Vec<Arrival>, batch_time: DateTime<Utc>) {
        let list = PublishedList {
            arrivals: Arc::new(arrivals),
            batch_time,
        };
        self.inner.boards.send_modify(|state| {
            state.lists.insert(platform.clone(), list);
            state.errors.insert(platform.clone(), false);
            state.loading.insert(platform.clone(), false);
        });
    }

    /// Finish a refresh unsuccessfully. The published list is left as is.
    pub fn mark_failed(&self, platform: &PlatformId) {
        self.inner.boards.send_modify(|state| {
            state.errors.insert(platform.clone(), true);
            state.loading.insert(platform.clone(), false);
        });
    }

    pub fn set_loading(&self, platform: &PlatformId, loading: bool) {
        self.inner.boards.send_modify(|state| {
            state.loading.insert(platform.clone(), loading);
        });
    }

    pub fn set_error(&self, platform: &PlatformId, error: bool) {
        self.inner.boards.send_modify(|state| {
            state.errors.insert(platform.clone(), error);
        });
    }

    /// Remove the platform's published list. Flags are untouched.
    ///
    /// Returns whether a list was present.
    pub fn remove(&self, platform: &PlatformId) -> bool {
        let mut removed = false;
        self.inner.boards.send_if_modified(|state| {
            removed = state.lists.remove(platform).is_some();
            removed
        });
        removed
    }

    /// Read one platform under a single lock.
    pub fn snapshot(&self, platform: &PlatformId) -> PlatformSnapshot {
        self.inner.boards.borrow().snapshot(platform)
    }

    /// Watch the per-platform state.
    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.inner.boards.subscribe()
    }

    /// Set or clear the arrival the map should centre on.
    pub fn focus(&self, arrival: Option<Arrival>) {
        self.inner.focused.send_replace(arrival);
    }

    pub fn focused(&self) -> Option<Arrival> {
        self.inner.focused.borrow().clone()
    }

    pub fn subscribe_focus(&self) -> watch::Receiver<Option<Arrival>> {
        self.inner.focused.subscribe()
    }

    /// Replace the subset of arrivals currently on screen.
    pub fn set_displayed(&self, arrivals: Vec<Arrival>) {
        self.inner.displayed.send_replace(Arc::new(arrivals));
    }

    pub fn displayed(&self) -> Arc<Vec<Arrival>> {
        self.inner.displayed.borrow().clone()
    }

    pub fn subscribe_displayed(&self) -> watch::Receiver<Arc<Vec<Arrival>>> {
        self.inner.displayed.subscribe()
    }
}
