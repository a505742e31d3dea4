//! Upstream arrivals API.
//!
//! The API answers `GET <base>/arrivals?stationid=<id>` with the routes
//! serving that station and up to three upcoming arrivals per route.
//! Responses are deliberately loose: fields may be missing or null, vehicle
//! IDs may be numbers or strings, and a coordinate of zero means "no fix".
//! Conversion into domain `Arrival`s absorbs all of that.

mod client;
mod convert;
mod error;
mod mock;
mod source;
mod types;

pub use client::{ArrivalsClient, ArrivalsConfig, DEFAULT_BASE_URL};
pub use convert::{convert_response, convert_service};
pub use error::UpstreamError;
pub use mock::{MockArrivalSource, MockBoard};
pub use source::ArrivalSource;
pub use types::{ArrivalsResponse, LocationDto, PredictionDto, RawVehicleId, ServiceDto};

#[cfg(test)]
pub(crate) use client::test_server;
