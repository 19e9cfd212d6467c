use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::response::{AppError, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SkillMasteryDto {
    learner_id: String,
    skill_id: String,
    mastery: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LearnerMasteryDto {
    learner_id: String,
    skills: BTreeMap<String, f64>,
}

/// Read-only estimate for one (learner, skill) pair. Unseen pairs
/// report the configured prior; this path never fails.
pub async fn get_skill(
    State(state): State<AppState>,
    Path((learner_id, skill_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let mastery = state.mastery().get_mastery(&learner_id, &skill_id).await;
    Ok(Json(SuccessResponse::new(SkillMasteryDto {
        learner_id,
        skill_id,
        mastery,
    })))
}

/// Snapshot of every skill the tracker has materialized for a learner.
pub async fn get_learner(
    State(state): State<AppState>,
    Path(learner_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let skills = state.mastery().learner_snapshot(&learner_id).await;
    Ok(Json(SuccessResponse::new(LearnerMasteryDto {
        learner_id,
        skills,
    })))
}
