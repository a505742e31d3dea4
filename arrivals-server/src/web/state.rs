//! Application state for the web layer.

use std::sync::Arc;

use crate::session::ArrivalSession;
use crate::upstream::ArrivalSource;

/// Shared application state.
///
/// Handlers reach the published state and the refresh pipeline through the
/// session.
pub struct AppState<S> {
    /// Arrival session for every platform
    pub session: Arc<ArrivalSession<S>>,
}

impl<S: ArrivalSource> AppState<S> {
    /// Create a new app state.
    pub fn new(session: Arc<ArrivalSession<S>>) -> Self {
        Self { session }
    }
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}
