//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::StationDirectory;
use crate::domain::{Arrival, Location, StationId};
use crate::session::PlatformSnapshot;

/// An arrival as exchanged over the API.
///
/// `display_number` and `minutes_away` are derived fields: they are always
/// present in responses and ignored in requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalDto {
    /// Raw route code (e.g. "500-CA")
    pub route_number: String,

    /// Route code as shown to riders
    #[serde(default)]
    pub display_number: String,

    /// Destination or route name
    pub route_name: String,

    /// Milliseconds until arrival
    pub duration_ms: u64,

    #[serde(default)]
    pub minutes_away: u64,

    /// Upstream station that reported the arrival
    pub station_id: String,

    /// Batch capture time, Unix milliseconds
    pub timestamp: i64,

    pub bus_no: Option<String>,

    pub vehicle_id: Option<String>,

    pub location: Option<LocationDto>,
}

/// Vehicle position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationDto {
    pub lat: f64,
    pub lng: f64,
}

/// Snapshot of one platform's published state.
#[derive(Debug, Serialize)]
pub struct PlatformArrivalsResponse {
    /// Canonical platform ID
    pub platform: String,

    /// Ranked arrivals; `null` when nothing is published
    pub arrivals: Option<Vec<ArrivalDto>>,

    /// Batch time of the published list, Unix milliseconds
    pub updated_at: Option<i64>,

    /// A refresh is in progress
    pub loading: bool,

    /// The last refresh failed
    pub error: bool,
}

/// A platform and the stations feeding it.
#[derive(Debug, Serialize)]
pub struct PlatformInfo {
    pub platform: String,
    pub stations: Vec<String>,
}

/// Response listing known platforms.
#[derive(Debug, Serialize)]
pub struct PlatformListResponse {
    pub platforms: Vec<PlatformInfo>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl ArrivalDto {
    /// Create from a domain Arrival.
    pub fn from_arrival(arrival: &Arrival) -> Self {
        Self {
            route_number: arrival.route_number().to_string(),
            display_number: arrival.display_number().to_string(),
            route_name: arrival.route_name().to_string(),
            duration_ms: arrival.duration_ms(),
            minutes_away: arrival.minutes_away(),
            station_id: arrival.station_id().to_string(),
            timestamp: arrival.timestamp().timestamp_millis(),
            bus_no: arrival.bus_no().map(str::to_string),
            vehicle_id: arrival.vehicle_id().map(str::to_string),
            location: arrival
                .location()
                .map(|l| LocationDto { lat: l.lat, lng: l.lng }),
        }
    }

    /// Convert into a domain Arrival, re-deriving the display fields.
    pub fn into_arrival(self) -> Result<Arrival, String> {
        let station = StationId::parse(&self.station_id)
            .map_err(|e| format!("Invalid station ID {:?}: {e}", self.station_id))?;
        let timestamp = DateTime::<Utc>::from_timestamp_millis(self.timestamp)
            .ok_or_else(|| format!("Timestamp out of range: {}", self.timestamp))?;
        let location = self
            .location
            .and_then(|l| Location::from_coordinates(Some(l.lat), Some(l.lng)));

        Ok(Arrival::new(
            self.route_number,
            self.route_name,
            self.duration_ms,
            station,
            timestamp,
        )
        .with_bus_no(self.bus_no)
        .with_vehicle_id(self.vehicle_id)
        .with_location(location))
    }
}

impl PlatformArrivalsResponse {
    pub fn from_snapshot(snapshot: &PlatformSnapshot) -> Self {
        Self {
            platform: snapshot.platform.to_string(),
            arrivals: snapshot
                .arrivals
                .as_ref()
                .map(|list| list.iter().map(ArrivalDto::from_arrival).collect()),
            updated_at: snapshot.updated_at.map(|t| t.timestamp_millis()),
            loading: snapshot.loading,
            error: snapshot.error,
        }
    }
}

impl PlatformListResponse {
    pub fn from_directory(directory: &StationDirectory) -> Self {
        let platforms = directory
            .platforms()
            .into_iter()
            .map(|p| PlatformInfo {
                platform: p.to_string(),
                stations: directory
                    .stations(p)
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            })
            .collect();

        Self { platforms }
    }
}
