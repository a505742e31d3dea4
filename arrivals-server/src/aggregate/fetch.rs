//! Per-station fetch loop.
//!
//! Stations are queried one at a time, in directory order. A station that
//! fails for any reason contributes nothing and the loop moves on; the
//! caller always gets whatever the other stations returned.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{Arrival, StationId};
use crate::upstream::{ArrivalSource, convert_response};

/// Outcome of fetching one batch of stations.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Capture time shared by every arrival in the batch.
    pub batch_time: DateTime<Utc>,
    /// Arrivals from every station that answered, in station order.
    pub arrivals: Vec<Arrival>,
    /// Stations whose fetch failed and were skipped.
    pub failed: Vec<StationId>,
}

/// Fetch arrivals for `stations`, stamping them with the current time.
pub async fn fetch_report<S: ArrivalSource>(source: &S, stations: &[StationId]) -> FetchReport {
    fetch_report_at(source, stations, Utc::now()).await
}

/// Fetch arrivals for `stations` with an explicit batch time.
pub async fn fetch_report_at<S: ArrivalSource>(
    source: &S,
    stations: &[StationId],
    batch_time: DateTime<Utc>,
) -> FetchReport {
    let mut arrivals = Vec::new();
    let mut failed = Vec::new();

    for station in stations {
        match source.fetch_station(station).await {
            Ok(board) => {
                let converted = convert_response(&board, station, batch_time);
                debug!(station = %station, arrivals = converted.len(), "fetched station");
                arrivals.extend(converted);
            }
            Err(e) => {
                warn!(station = %station, error = %e, "failed to fetch arrivals, skipping station");
                failed.push(station.clone());
            }
        }
    }

    FetchReport {
        batch_time,
        arrivals,
        failed,
    }
}

/// Fetch arrivals for `stations`, discarding the failure report.
pub async fn fetch_arrivals<S: ArrivalSource>(source: &S, stations: &[StationId]) -> Vec<Arrival> {
    fetch_report(source, stations).await.arrivals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::test_server::{Reply, serve};
    use crate::upstream::{
        ArrivalsClient, ArrivalsConfig, ArrivalsResponse, MockArrivalSource, PredictionDto,
        ServiceDto,
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use std::collections::HashMap;

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn board(route: &str, durations: &[f64]) -> ArrivalsResponse {
        let mut slots = durations.iter().map(|&d| {
            Some(PredictionDto {
                duration_ms: Some(d),
                ..Default::default()
            })
        });
        ArrivalsResponse {
            services: vec![ServiceDto {
                no: Some(route.to_string()),
                destination: Some("Majestic".to_string()),
                frequency: Some(durations.len() as f64),
                next: slots.next().flatten(),
                next2: slots.next().flatten(),
                next3: slots.next().flatten(),
            }],
        }
    }

    #[tokio::test]
    async fn collects_from_every_station_in_order() {
        let mock = MockArrivalSource::new();
        mock.set_board(id("20623"), board("500", &[1000.0])).await;
        mock.set_board(id("20624"), board("201", &[2000.0, 3000.0])).await;

        let stations = [id("20623"), id("20624")];
        let report = fetch_report(&mock, &stations).await;

        let routes: Vec<_> = report.arrivals.iter().map(|a| a.route_number()).collect();
        assert_eq!(routes, vec!["500", "201", "201"]);
        assert!(report.failed.is_empty());
        assert_eq!(mock.requests().await, stations.to_vec());
    }

    #[tokio::test]
    async fn failed_station_is_skipped() {
        let mock = MockArrivalSource::new();
        mock.set_failure(id("20623"), 500).await;
        mock.set_board(id("20624"), board("201", &[2000.0])).await;

        let report = fetch_report(&mock, &[id("20623"), id("20624")]).await;

        assert_eq!(report.arrivals.len(), 1);
        assert_eq!(report.arrivals[0].station_id(), &id("20624"));
        assert_eq!(report.failed, vec![id("20623")]);
    }

    #[tokio::test]
    async fn all_stations_failing_yields_empty_list() {
        let mock = MockArrivalSource::new();
        let arrivals = fetch_arrivals(&mock, &[id("1"), id("2")]).await;
        assert!(arrivals.is_empty());
        assert_eq!(mock.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn no_stations_makes_no_requests() {
        let mock = MockArrivalSource::new();
        let arrivals = fetch_arrivals(&mock, &[]).await;
        assert!(arrivals.is_empty());
        assert!(mock.requests().await.is_empty());
    }

    #[tokio::test]
    async fn batch_time_is_shared_across_stations() {
        let mock = MockArrivalSource::new();
        mock.set_board(id("1"), board("500", &[1000.0])).await;
        mock.set_board(id("2"), board("201", &[2000.0])).await;
        mock.set_delay(Some(std::time::Duration::from_millis(20))).await;

        let report = fetch_report(&mock, &[id("1"), id("2")]).await;

        assert_eq!(report.arrivals.len(), 2);
        assert!(report.arrivals.iter().all(|a| a.timestamp() == report.batch_time));
    }

    #[tokio::test]
    async fn partial_failure_over_http() {
        let base = serve(HashMap::from([
            (
                "20623",
                Reply::Json(json!({
                    "services": [{
                        "no": "500-CA",
                        "destination": "Kempegowda",
                        "frequency": 2,
                        "next": {"duration_ms": 60000, "vehicle_id": 11},
                        "next2": {"duration_ms": 600000, "vehicle_id": 12}
                    }]
                })),
            ),
            ("20624", Reply::Status(StatusCode::BAD_GATEWAY)),
        ]))
        .await;

        let client = ArrivalsClient::new(ArrivalsConfig::new().with_base_url(base)).unwrap();
        let report = fetch_report(&client, &[id("20624"), id("20623"), id("20621")]).await;

        assert_eq!(report.arrivals.len(), 2);
        assert!(report.arrivals.iter().all(|a| a.station_id() == &id("20623")));
        assert_eq!(report.failed, vec![id("20624"), id("20621")]);
    }

    #[tokio::test]
    async fn odd_service_does_not_fail_the_station() {
        let base = serve(HashMap::from([(
            "20623",
            Reply::Json(json!({
                "services": [
                    {"no": "201", "frequency": 1, "next": {"duration_ms": "soon"}},
                    {"no": "500-CA", "frequency": 2.0, "next": {"duration_ms": 60000, "bus_no": 4411}},
                    42
                ]
            })),
        )]))
        .await;

        let client = ArrivalsClient::new(ArrivalsConfig::new().with_base_url(base)).unwrap();
        let report = fetch_report(&client, &[id("20623")]).await;

        assert!(report.failed.is_empty());
        assert_eq!(report.arrivals.len(), 1);
        assert_eq!(report.arrivals[0].route_number(), "500-CA");
        assert_eq!(report.arrivals[0].bus_no(), Some("4411"));
    }
}
