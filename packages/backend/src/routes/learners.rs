use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::db;
use crate::response::{AppError, SuccessResponse};
use crate::state::AppState;

/// Aggregate view over the persisted observation log.
pub async fn stats(
    State(state): State<AppState>,
    Path(learner_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let Some(pool) = state.db() else {
        return Err(AppError::service_unavailable(
            "observation store is not configured",
        ));
    };

    let stats = db::learner_stats(pool, &learner_id).await.map_err(|err| {
        tracing::error!(error = %err, "learner stats query failed");
        AppError::internal("failed to compute learner stats")
    })?;

    Ok(Json(SuccessResponse::new(stats)))
}
