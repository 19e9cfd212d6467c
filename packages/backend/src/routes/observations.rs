use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::{self, ObservationRow};
use crate::response::{AppError, SuccessResponse};
use crate::state::AppState;

const MAX_REPORTED_ERRORS: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ObservationRequest {
    learner_id: String,
    skill_id: String,
    correct: Value,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ObservationDto {
    learner_id: String,
    skill_id: String,
    correct: bool,
    mastery: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IngestReportDto {
    rows_ok: usize,
    rows_skipped: usize,
    errors: Vec<String>,
}

pub async fn ingest(
    State(state): State<AppState>,
    Json(payload): Json<ObservationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let observation = validate(payload)?;
    let dto = apply(&state, observation).await;
    Ok(Json(SuccessResponse::new(dto)))
}

pub async fn ingest_batch(
    State(state): State<AppState>,
    Json(rows): Json<Vec<Value>>,
) -> Result<impl IntoResponse, AppError> {
    let mut rows_ok = 0usize;
    let mut rows_skipped = 0usize;
    let mut errors: Vec<String> = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        let parsed = serde_json::from_value::<ObservationRequest>(row)
            .map_err(|err| err.to_string())
            .and_then(|req| validate(req).map_err(|err| err.message().to_string()));

        match parsed {
            Ok(observation) => {
                apply(&state, observation).await;
                rows_ok += 1;
            }
            Err(reason) => {
                rows_skipped += 1;
                if errors.len() < MAX_REPORTED_ERRORS {
                    errors.push(format!("row {}: {reason}", index + 1));
                }
            }
        }
    }

    Ok(Json(SuccessResponse::new(IngestReportDto {
        rows_ok,
        rows_skipped,
        errors,
    })))
}

struct ValidObservation {
    learner_id: String,
    skill_id: String,
    correct: bool,
    timestamp: String,
}

/// Boundary checks for one observation. Runs before any state
/// mutation so a rejected update leaves the tracker untouched.
fn validate(request: ObservationRequest) -> Result<ValidObservation, AppError> {
    if request.learner_id.is_empty() {
        return Err(AppError::validation("learnerId must be a non-empty string"));
    }
    if request.skill_id.is_empty() {
        return Err(AppError::validation("skillId must be a non-empty string"));
    }
    let correct = parse_correct(&request.correct).ok_or_else(|| {
        AppError::invalid_observation("correct must be a boolean or 0/1")
    })?;

    let timestamp = request
        .timestamp
        .map(|ts| ts.trim().to_string())
        .filter(|ts| !ts.is_empty())
        .unwrap_or_else(now_iso);

    Ok(ValidObservation {
        learner_id: request.learner_id,
        skill_id: request.skill_id,
        correct,
        timestamp,
    })
}

/// Accept JSON `true`/`false` and the integers 0/1; everything else is
/// an invalid observation.
fn parse_correct(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

async fn apply(state: &AppState, observation: ValidObservation) -> ObservationDto {
    let mastery = state
        .mastery()
        .record_observation(&observation.learner_id, &observation.skill_id, observation.correct)
        .await;

    if let Some(pool) = state.db() {
        let row = ObservationRow {
            learner_id: observation.learner_id.clone(),
            skill_id: observation.skill_id.clone(),
            correct: observation.correct,
            timestamp: observation.timestamp,
        };
        if let Err(err) = db::insert_observation(pool, &row).await {
            tracing::warn!(error = %err, "failed to persist observation");
        }
    }

    ObservationDto {
        learner_id: observation.learner_id,
        skill_id: observation.skill_id,
        correct: observation.correct,
        mastery,
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
