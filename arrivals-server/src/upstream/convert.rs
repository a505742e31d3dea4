//! Conversion from upstream DTOs to domain arrivals.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{Arrival, Location, StationId};

use super::types::{ArrivalsResponse, PredictionDto, ServiceDto};

/// Maximum number of prediction slots a service can carry.
const MAX_SLOTS: usize = 3;

/// Convert one station's response into arrivals.
///
/// Every arrival is stamped with `batch_time` and attributed to `station`.
/// Slots beyond the service's `frequency`, and slots without a usable
/// duration, are skipped.
pub fn convert_response(
    response: &ArrivalsResponse,
    station: &StationId,
    batch_time: DateTime<Utc>,
) -> Vec<Arrival> {
    response
        .services
        .iter()
        .flat_map(|service| convert_service(service, station, batch_time))
        .collect()
}

/// Convert a single service into up to three arrivals.
pub fn convert_service(
    service: &ServiceDto,
    station: &StationId,
    batch_time: DateTime<Utc>,
) -> Vec<Arrival> {
    let route_number = service.no.as_deref().unwrap_or_default();
    let route_name = service.destination.as_deref().unwrap_or_default();
    let known = slot_count(service.frequency);

    service
        .slots()
        .into_iter()
        .take(known)
        .flatten()
        .filter_map(|slot| {
            let arrival = convert_slot(slot, route_number, route_name, station, batch_time);
            if arrival.is_none() {
                debug!(station = %station, route = route_number, "skipping slot without usable duration");
            }
            arrival
        })
        .collect()
}

fn convert_slot(
    slot: &PredictionDto,
    route_number: &str,
    route_name: &str,
    station: &StationId,
    batch_time: DateTime<Utc>,
) -> Option<Arrival> {
    let duration_ms = slot.duration_ms.and_then(duration_from_raw)?;

    let location = slot
        .location
        .as_ref()
        .and_then(|loc| Location::from_coordinates(loc.lat, loc.lng));

    Some(
        Arrival::new(
            route_number,
            route_name,
            duration_ms,
            station.clone(),
            batch_time,
        )
        .with_bus_no(slot.bus_no.clone())
        .with_vehicle_id(slot.vehicle_id.as_ref().and_then(|v| v.normalize()))
        .with_location(location),
    )
}

/// Number of slots to read for a given `frequency`. Fractions round down.
fn slot_count(frequency: Option<f64>) -> usize {
    let frequency = frequency.filter(|f| f.is_finite()).unwrap_or(0.0).floor();
    frequency.clamp(0.0, MAX_SLOTS as f64) as usize
}

/// Whole milliseconds from the wire value. Negative and non-finite values
/// are not predictions.
fn duration_from_raw(ms: f64) -> Option<u64> {
    if ms.is_finite() && ms >= 0.0 {
        Some(ms as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::types::{LocationDto, RawVehicleId};
    use chrono::TimeZone;

    fn station() -> StationId {
        StationId::parse("20623").unwrap()
    }

    fn batch_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    fn slot(duration_ms: f64) -> PredictionDto {
        PredictionDto {
            duration_ms: Some(duration_ms),
            ..Default::default()
        }
    }

    fn service(no: &str, frequency: f64, slots: [Option<PredictionDto>; 3]) -> ServiceDto {
        let [next, next2, next3] = slots;
        ServiceDto {
            no: Some(no.to_string()),
            destination: Some("Majestic".to_string()),
            frequency: Some(frequency),
            next,
            next2,
            next3,
        }
    }

    #[test]
    fn convert_simple_service() {
        let svc = service("500-CA", 1.0, [Some(slot(125_000.0)), None, None]);
        let arrivals = convert_service(&svc, &station(), batch_time());

        assert_eq!(arrivals.len(), 1);
        let a = &arrivals[0];
        assert_eq!(a.route_number(), "500-CA");
        assert_eq!(a.display_number(), "500CA");
        assert_eq!(a.route_name(), "Majestic");
        assert_eq!(a.duration_ms(), 125_000);
        assert_eq!(a.minutes_away(), 2);
        assert_eq!(a.station_id(), &station());
        assert_eq!(a.timestamp(), batch_time());
        assert!(a.location().is_none());
    }

    #[test]
    fn frequency_limits_slots() {
        let svc = service(
            "201",
            2.0,
            [Some(slot(1.0)), Some(slot(2.0)), Some(slot(3.0))],
        );
        let durations: Vec<_> = convert_service(&svc, &station(), batch_time())
            .iter()
            .map(|a| a.duration_ms())
            .collect();
        assert_eq!(durations, vec![1, 2]);
    }

    #[test]
    fn frequency_above_three_reads_three() {
        let svc = service(
            "201",
            7.0,
            [Some(slot(1.0)), Some(slot(2.0)), Some(slot(3.0))],
        );
        assert_eq!(convert_service(&svc, &station(), batch_time()).len(), 3);
    }

    #[test]
    fn missing_or_negative_frequency_reads_nothing() {
        let mut svc = service("201", 0.0, [Some(slot(1.0)), None, None]);
        svc.frequency = None;
        assert!(convert_service(&svc, &station(), batch_time()).is_empty());

        svc.frequency = Some(-2.0);
        assert!(convert_service(&svc, &station(), batch_time()).is_empty());
    }

    #[test]
    fn fractional_frequency_rounds_down() {
        let svc = service(
            "201",
            2.7,
            [Some(slot(1.0)), Some(slot(2.0)), Some(slot(3.0))],
        );
        assert_eq!(convert_service(&svc, &station(), batch_time()).len(), 2);
    }

    #[test]
    fn slot_without_duration_is_skipped() {
        let svc = service(
            "201",
            3.0,
            [Some(slot(1.0)), Some(PredictionDto::default()), Some(slot(3.0))],
        );
        let durations: Vec<_> = convert_service(&svc, &station(), batch_time())
            .iter()
            .map(|a| a.duration_ms())
            .collect();
        assert_eq!(durations, vec![1, 3]);
    }

    #[test]
    fn absent_slot_within_frequency_is_skipped() {
        let svc = service("201", 3.0, [None, Some(slot(2.0)), None]);
        let arrivals = convert_service(&svc, &station(), batch_time());
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].duration_ms(), 2);
    }

    #[test]
    fn negative_duration_is_skipped() {
        let svc = service("201", 1.0, [Some(slot(-5.0)), None, None]);
        assert!(convert_service(&svc, &station(), batch_time()).is_empty());
    }

    #[test]
    fn fractional_duration_truncates() {
        let svc = service("201", 1.0, [Some(slot(59_999.9)), None, None]);
        let arrivals = convert_service(&svc, &station(), batch_time());
        assert_eq!(arrivals[0].duration_ms(), 59_999);
        assert_eq!(arrivals[0].minutes_away(), 0);
    }

    #[test]
    fn missing_route_fields_default_to_empty() {
        let svc = ServiceDto {
            frequency: Some(1.0),
            next: Some(slot(10.0)),
            ..Default::default()
        };
        let arrivals = convert_service(&svc, &station(), batch_time());
        assert_eq!(arrivals[0].route_number(), "");
        assert_eq!(arrivals[0].display_number(), "");
        assert_eq!(arrivals[0].route_name(), "");
    }

    #[test]
    fn vehicle_details_pass_through() {
        let prediction = PredictionDto {
            duration_ms: Some(60_000.0),
            vehicle_id: Some(RawVehicleId::Integer(4471)),
            bus_no: Some("KA57F1234".to_string()),
            location: Some(LocationDto {
                lat: Some(12.97),
                lng: Some(77.59),
            }),
        };
        let svc = service("500", 1.0, [Some(prediction), None, None]);
        let a = &convert_service(&svc, &station(), batch_time())[0];

        assert_eq!(a.vehicle_id(), Some("4471"));
        assert_eq!(a.bus_no(), Some("KA57F1234"));
        assert_eq!(
            a.location(),
            Some(Location {
                lat: 12.97,
                lng: 77.59
            })
        );
    }

    #[test]
    fn zero_coordinate_drops_location() {
        let prediction = PredictionDto {
            duration_ms: Some(60_000.0),
            location: Some(LocationDto {
                lat: Some(0.0),
                lng: Some(77.59),
            }),
            ..Default::default()
        };
        let svc = service("500", 1.0, [Some(prediction), None, None]);
        let a = &convert_service(&svc, &station(), batch_time())[0];
        assert!(a.location().is_none());
    }

    #[test]
    fn convert_response_flattens_services() {
        let response = ArrivalsResponse {
            services: vec![
                service("500", 2.0, [Some(slot(1.0)), Some(slot(2.0)), None]),
                service("201", 1.0, [Some(slot(3.0)), None, None]),
            ],
        };
        let arrivals = convert_response(&response, &station(), batch_time());
        let routes: Vec<_> = arrivals.iter().map(|a| a.route_number()).collect();
        assert_eq!(routes, vec!["500", "500", "201"]);
    }
}
