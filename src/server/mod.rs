mod handlers;
mod state;

use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/weather", get(handlers::weather))
        .route("/healthz", get(handlers::healthz))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, state: AppState) {
    let app = build_router(Arc::new(state));
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  Weathervane listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FlagSource;
    use crate::weather::WeatherClient;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    // Unroutable provider: any fetch attempt comes back as a 502, so a
    // 400 below proves validation ran before any outbound call.
    fn router() -> Router {
        build_router(Arc::new(AppState {
            weather: WeatherClient::new("http://127.0.0.1:1", "test-key"),
            flags: FlagSource::Disabled,
        }))
    }

    async fn status_for(uri: &str) -> StatusCode {
        router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn missing_location_rejected_before_any_fetch() {
        assert_eq!(status_for("/weather").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_for("/weather?location=").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_for("/weather?location=%20%20").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn provider_failure_surfaces_as_bad_gateway() {
        assert_eq!(status_for("/weather?location=London").await, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn healthz_is_alive() {
        assert_eq!(status_for("/healthz").await, StatusCode::OK);
    }
}
