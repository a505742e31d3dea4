//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::domain::{Arrival, PlatformId};
use crate::upstream::ArrivalSource;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<S>(state: AppState<S>) -> Router
where
    S: ArrivalSource + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/platforms", get(list_platforms::<S>))
        .route(
            "/api/platforms/:platform/arrivals",
            get(platform_arrivals::<S>).delete(clear_arrivals::<S>),
        )
        .route(
            "/api/platforms/:platform/refresh",
            post(refresh_platform::<S>),
        )
        .route("/api/focus", get(get_focus::<S>).put(put_focus::<S>))
        .route(
            "/api/displayed",
            get(get_displayed::<S>).put(put_displayed::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Known platforms and the stations feeding each.
async fn list_platforms<S: ArrivalSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<PlatformListResponse> {
    Json(PlatformListResponse::from_directory(
        state.session.directory(),
    ))
}

fn parse_platform(raw: &str) -> Result<PlatformId, AppError> {
    let platform = PlatformId::new(raw);
    if platform.as_str().is_empty() {
        return Err(AppError::BadRequest {
            message: "Platform must not be blank".to_string(),
        });
    }
    Ok(platform)
}

/// Current published state of one platform.
async fn platform_arrivals<S: ArrivalSource + 'static>(
    State(state): State<AppState<S>>,
    Path(platform): Path<String>,
) -> Result<Json<PlatformArrivalsResponse>, AppError> {
    let platform = parse_platform(&platform)?;
    let snapshot = state.session.snapshot(&platform);
    Ok(Json(PlatformArrivalsResponse::from_snapshot(&snapshot)))
}

/// Refresh one platform and return its state afterwards.
async fn refresh_platform<S: ArrivalSource + 'static>(
    State(state): State<AppState<S>>,
    Path(platform): Path<String>,
) -> Result<Json<PlatformArrivalsResponse>, AppError> {
    let platform = parse_platform(&platform)?;
    let outcome = state.session.refresh(&platform).await;
    info!(platform = %platform, ?outcome, "refresh requested");

    let snapshot = state.session.snapshot(&platform);
    Ok(Json(PlatformArrivalsResponse::from_snapshot(&snapshot)))
}

/// Remove a platform's published list.
async fn clear_arrivals<S: ArrivalSource + 'static>(
    State(state): State<AppState<S>>,
    Path(platform): Path<String>,
) -> Result<StatusCode, AppError> {
    let platform = parse_platform(&platform)?;
    state.session.clear(&platform);
    Ok(StatusCode::NO_CONTENT)
}

async fn get_focus<S: ArrivalSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<Option<ArrivalDto>> {
    let focused = state.session.published().focused();
    Json(focused.as_ref().map(ArrivalDto::from_arrival))
}

/// Set or clear (with a `null` body) the focused arrival.
async fn put_focus<S: ArrivalSource + 'static>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Json<Option<ArrivalDto>>, AppError> {
    let dto: Option<ArrivalDto> = parse_json(&body)?;
    let arrival = dto.map(into_arrival).transpose()?;

    let response = arrival.as_ref().map(ArrivalDto::from_arrival);
    state.session.published().focus(arrival);
    Ok(Json(response))
}

async fn get_displayed<S: ArrivalSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<Vec<ArrivalDto>> {
    let displayed = state.session.published().displayed();
    Json(displayed.iter().map(ArrivalDto::from_arrival).collect())
}

/// Replace the displayed subset.
async fn put_displayed<S: ArrivalSource + 'static>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Json<Vec<ArrivalDto>>, AppError> {
    let dtos: Vec<ArrivalDto> = parse_json(&body)?;
    let arrivals = dtos
        .into_iter()
        .map(into_arrival)
        .collect::<Result<Vec<_>, _>>()?;

    let response = arrivals.iter().map(ArrivalDto::from_arrival).collect();
    state.session.published().set_displayed(arrivals);
    Ok(Json(response))
}

/// Parse a JSON body by hand so malformed input gets our error shape.
fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest {
        message: format!("Invalid JSON: {e}"),
    })
}

fn into_arrival(dto: ArrivalDto) -> Result<Arrival, AppError> {
    dto.into_arrival()
        .map_err(|message| AppError::BadRequest { message })
}

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
        };

        warn!(%status, error = %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
