use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use learntwin_algo::{Candidate, ItemRecord};

use crate::response::{AppError, SuccessResponse};
use crate::state::AppState;

const DEFAULT_K: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecommendRequest {
    learner_id: String,
    /// Absent means "rank the full catalog".
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    k: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationsDto {
    learner_id: String,
    items: Vec<ItemRecord>,
    count: usize,
}

pub async fn next_items(
    State(state): State<AppState>,
    Json(payload): Json<RecommendRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.learner_id.is_empty() {
        return Err(AppError::validation("learnerId must be a non-empty string"));
    }
    let k = payload.k.unwrap_or(DEFAULT_K);

    let items = state
        .mastery()
        .next_items(&payload.learner_id, payload.candidates.as_deref(), k)
        .await;

    Ok(Json(SuccessResponse::new(RecommendationsDto {
        learner_id: payload.learner_id,
        count: items.len(),
        items,
    })))
}
