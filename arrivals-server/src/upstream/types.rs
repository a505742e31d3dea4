//! Upstream arrivals API response DTOs.
//!
//! These types map directly to the JSON returned by
//! `GET <base>/arrivals?stationid=<id>`. Nearly everything is optional:
//! the upstream omits or nulls fields freely, and defaults are applied
//! during conversion rather than here.
//!
//! Decoding is lenient below the top level. A service that doesn't decode
//! is dropped on its own, and a field of the wrong type reads as absent,
//! so one odd record never costs the rest of the board.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::debug;

/// Response body for one station.
///
/// `services` is the only required field and must be an array. A body
/// without it is treated as a failed fetch for that station.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArrivalsResponse {
    #[serde(deserialize_with = "decodable_services")]
    pub services: Vec<ServiceDto>,
}

impl ArrivalsResponse {
    /// The same board as it would read `elapsed` later: every prediction
    /// is that much closer. Predictions that go negative have arrived and
    /// are dropped during conversion.
    pub fn aged(&self, elapsed: Duration) -> Self {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let mut aged = self.clone();
        for service in &mut aged.services {
            for slot in [&mut service.next, &mut service.next2, &mut service.next3]
                .into_iter()
                .flatten()
            {
                if let Some(ms) = slot.duration_ms.as_mut() {
                    *ms -= elapsed_ms;
                }
            }
        }
        aged
    }
}

/// One route serving the station, with up to three upcoming arrivals.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDto {
    /// Raw route code, e.g. `"500-CA"`. Bare numbers are kept as text.
    #[serde(default, deserialize_with = "text_or_number")]
    pub no: Option<String>,

    /// Destination or route name.
    #[serde(default, deserialize_with = "text_or_number")]
    pub destination: Option<String>,

    /// How many of the prediction slots below are populated (0-3).
    /// Sometimes sent as a float.
    #[serde(default, deserialize_with = "lenient")]
    pub frequency: Option<f64>,

    /// Next arrival.
    #[serde(default, deserialize_with = "lenient")]
    pub next: Option<PredictionDto>,

    /// Arrival after next.
    #[serde(default, deserialize_with = "lenient")]
    pub next2: Option<PredictionDto>,

    /// Third upcoming arrival.
    #[serde(default, deserialize_with = "lenient")]
    pub next3: Option<PredictionDto>,
}

impl ServiceDto {
    /// The three prediction slots, nearest first.
    pub fn slots(&self) -> [Option<&PredictionDto>; 3] {
        [self.next.as_ref(), self.next2.as_ref(), self.next3.as_ref()]
    }
}

/// A single predicted arrival.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionDto {
    /// Milliseconds until the vehicle arrives.
    pub duration_ms: Option<f64>,

    /// Upstream vehicle identifier. Sent as a number, occasionally as a string.
    #[serde(default, deserialize_with = "lenient")]
    pub vehicle_id: Option<RawVehicleId>,

    /// Registration number painted on the bus. Numbers are kept as text.
    #[serde(default, deserialize_with = "text_or_number")]
    pub bus_no: Option<String>,

    /// Last reported position of the vehicle.
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<LocationDto>,
}

/// Vehicle identifier as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawVehicleId {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawVehicleId {
    /// Textual form of the identifier, or `None` if the upstream sent a
    /// placeholder (`0` or `""`).
    pub fn normalize(&self) -> Option<String> {
        match self {
            RawVehicleId::Integer(0) => None,
            RawVehicleId::Integer(n) => Some(n.to_string()),
            RawVehicleId::Float(f) if *f == 0.0 || !f.is_finite() => None,
            RawVehicleId::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
            RawVehicleId::Float(f) => Some(f.to_string()),
            RawVehicleId::Text(s) if s.is_empty() => None,
            RawVehicleId::Text(s) => Some(s.clone()),
        }
    }
}

/// Vehicle coordinates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationDto {
    #[serde(default, deserialize_with = "lenient")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub lng: Option<f64>,
}

/// Decode each service on its own, dropping the ones that don't fit.
fn decodable_services<'de, D>(deserializer: D) -> Result<Vec<ServiceDto>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(service) => Some(service),
            Err(e) => {
                debug!(error = %e, "skipping malformed service");
                None
            }
        })
        .collect())
}

/// An optional field that reads as absent when it has the wrong type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match serde_json::from_value(v) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            debug!(error = %e, "ignoring malformed field");
            None
        }
    }))
}

/// An optional text field the upstream sometimes sends as a number.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
