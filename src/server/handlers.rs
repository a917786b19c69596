use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

use crate::flags::Target;
use crate::units::UnitSystem;
use crate::weather::WeatherReport;

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

/// Errors are relayed as plain text: the status plus the underlying
/// error description, nothing more.
#[derive(Debug)]
pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /healthz ────────────────────────────────────────────────

pub async fn healthz() -> &'static str {
    "ok"
}

// ─── GET /weather ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct WeatherQuery {
    pub location: Option<String>,
}

pub async fn weather(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WeatherQuery>,
    headers: HeaderMap,
) -> Result<Json<WeatherReport>, ApiError> {
    let start = Instant::now();

    // Rejected before any outbound call is made.
    let location = validate_location(params.location.as_deref())?;

    let target = request_target(&headers);
    let decision = state.flags.decision(&target);
    let units = UnitSystem::resolve(unit_hint(&headers), decision);

    let report = state.weather.fetch(location, units).map_err(|e| {
        eprintln!(
            "[{}] GET /weather?location={} -> ERROR: {}",
            Utc::now().format("%H:%M:%S"),
            location,
            e,
        );
        api_error(StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    let elapsed = start.elapsed();
    eprintln!(
        "[{}] GET /weather?location={} units={} -> {} ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        location,
        units,
        report.name,
        elapsed.as_secs_f64() * 1000.0,
    );

    Ok(Json(report))
}

fn validate_location(raw: Option<&str>) -> Result<&str, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(location) => Ok(location),
        None => Err(api_error(StatusCode::BAD_REQUEST, "location not specified")),
    }
}

/// The caller's unit-system hint, if the header is present and readable.
/// Validity is the resolver's business, not ours.
fn unit_hint(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-unit-system").and_then(|v| v.to_str().ok())
}

/// Evaluation identity for this request: the caller's own, when supplied,
/// otherwise the fixed service identity.
fn request_target(headers: &HeaderMap) -> Target {
    let caller_id = headers
        .get("x-caller-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match caller_id {
        Some(id) => {
            let location = headers
                .get("x-caller-location")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from);
            Target::caller(id, location)
        }
        None => Target::service(),
    }
}
