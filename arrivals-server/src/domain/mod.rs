//! Domain types for platform arrivals.
//!
//! Identifiers validate or canonicalize at construction, and an `Arrival`
//! derives its display fields once, so code receiving these types can trust
//! them without re-checking.

mod arrival;
mod platform;
mod route;
mod station;

pub use arrival::{Arrival, Location};
pub use platform::PlatformId;
pub use route::format_route_number;
pub use station::{InvalidStationId, StationId};
