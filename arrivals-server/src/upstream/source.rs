//! The seam between the fetcher and wherever arrivals come from.

use std::future::Future;
use std::sync::Arc;

use crate::domain::StationId;

use super::error::UpstreamError;
use super::types::ArrivalsResponse;

/// Something that can produce the raw arrivals board for one station.
///
/// Implemented by the live HTTP client, the caching wrapper, and the mock
/// used in development and tests.
pub trait ArrivalSource: Send + Sync {
    /// Fetch the current board for `station`.
    fn fetch_station(
        &self,
        station: &StationId,
    ) -> impl Future<Output = Result<Arc<ArrivalsResponse>, UpstreamError>> + Send;
}
