mod health;
mod learners;
mod mastery;
mod observations;
mod recommendations;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::middleware::auth::require_api_key;
use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/observations", post(observations::ingest))
        .route("/api/observations/batch", post(observations::ingest_batch))
        .route("/api/mastery/:learnerId/:skillId", get(mastery::get_skill))
        .route("/api/mastery/:learnerId", get(mastery::get_learner))
        .route("/api/recommendations", post(recommendations::next_items))
        .route("/api/learners/:learnerId/stats", get(learners::stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .merge(api)
        .nest("/health", health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "route not found").into_response()
}
