//! The normalized arrival record.

use chrono::{DateTime, Utc};

use super::StationId;
use super::route::format_route_number;

/// Milliseconds in one minute.
const MS_PER_MINUTE: u64 = 60_000;

/// A geographic position reported by the vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    /// Build a location from optional coordinates.
    ///
    /// Both coordinates must be present and non-zero. A zero latitude or
    /// longitude is treated as "unknown", matching how the upstream reports
    /// vehicles without a GPS fix.
    pub fn from_coordinates(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        let lat = lat.filter(|v| is_known_coordinate(*v))?;
        let lng = lng.filter(|v| is_known_coordinate(*v))?;
        Some(Location { lat, lng })
    }
}

fn is_known_coordinate(v: f64) -> bool {
    v != 0.0 && !v.is_nan()
}

/// One predicted arrival of a vehicle at an upstream station.
///
/// Construct with [`Arrival::new`] and the `with_*` methods. The display
/// route and minutes-away are derived at construction and cannot drift from
/// the raw values.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrival {
    route_number: String,
    display_number: String,
    route_name: String,
    duration_ms: u64,
    minutes_away: u64,
    station_id: StationId,
    timestamp: DateTime<Utc>,
    bus_no: Option<String>,
    vehicle_id: Option<String>,
    location: Option<Location>,
}

impl Arrival {
    /// Create an arrival with no vehicle details.
    pub fn new(
        route_number: impl Into<String>,
        route_name: impl Into<String>,
        duration_ms: u64,
        station_id: StationId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let route_number = route_number.into();
        Self {
            display_number: format_route_number(&route_number),
            route_number,
            route_name: route_name.into(),
            duration_ms,
            minutes_away: duration_ms / MS_PER_MINUTE,
            station_id,
            timestamp,
            bus_no: None,
            vehicle_id: None,
            location: None,
        }
    }

    /// Set the bus registration number. Empty strings count as absent.
    pub fn with_bus_no(mut self, bus_no: Option<String>) -> Self {
        self.bus_no = bus_no.filter(|s| !s.is_empty());
        self
    }

    /// Set the vehicle identifier. Empty strings count as absent.
    pub fn with_vehicle_id(mut self, vehicle_id: Option<String>) -> Self {
        self.vehicle_id = vehicle_id.filter(|s| !s.is_empty());
        self
    }

    /// Set the vehicle's last known position.
    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    /// Raw route code as reported upstream (e.g. `"500-CA"`).
    pub fn route_number(&self) -> &str {
        &self.route_number
    }

    /// Route code as shown to riders (e.g. `"500CA"`).
    pub fn display_number(&self) -> &str {
        &self.display_number
    }

    /// Destination or route name.
    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Whole minutes until arrival, rounded down.
    pub fn minutes_away(&self) -> u64 {
        self.minutes_away
    }

    /// The upstream station that reported this arrival.
    pub fn station_id(&self) -> &StationId {
        &self.station_id
    }

    /// When the batch containing this arrival was captured.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn bus_no(&self) -> Option<&str> {
        self.bus_no.as_deref()
    }

    pub fn vehicle_id(&self) -> Option<&str> {
        self.vehicle_id.as_deref()
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }
}
