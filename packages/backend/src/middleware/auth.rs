use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderName, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::response::AppError;
use crate::state::AppState;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// API-key gate for the `/api` surface.
///
/// A no-op when no key is configured, so local development and tests
/// run open. Health endpoints are routed outside this middleware.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key() else {
        return next.run(req).await;
    };

    let provided = req
        .headers()
        .get(&API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(expected) {
        return AppError::unauthorized("invalid API key").into_response();
    }

    next.run(req).await
}
