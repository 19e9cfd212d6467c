use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(live))
        .route("/ready", get(ready))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LivenessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadinessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    checks: ReadinessChecks,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadinessChecks {
    database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database_latency_ms: Option<u64>,
}

async fn root(State(state): State<AppState>) -> Response {
    let db_status = database_check(&state).await;
    let ok = !matches!(db_status, DbCheckStatus::Disconnected);

    let response = HealthResponse {
        status: if ok { "ok" } else { "degraded" },
        database: db_status.label(),
        timestamp: now_iso(),
    };

    let status_code = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    Json(LivenessResponse {
        status: "healthy",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
    })
    .into_response()
}

async fn ready(State(state): State<AppState>) -> Response {
    let db_check = database_check(&state).await;
    let (status, latency) = match db_check {
        DbCheckStatus::Connected { latency_ms } => ("healthy", Some(latency_ms)),
        DbCheckStatus::NotConfigured => ("healthy", None),
        DbCheckStatus::Disconnected => ("unhealthy", None),
    };

    let response = ReadinessResponse {
        status,
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        checks: ReadinessChecks {
            database: db_check.label(),
            database_latency_ms: latency,
        },
    };

    let status_code = if status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}

enum DbCheckStatus {
    Connected { latency_ms: u64 },
    NotConfigured,
    Disconnected,
}

impl DbCheckStatus {
    fn label(&self) -> &'static str {
        match self {
            DbCheckStatus::Connected { .. } => "connected",
            DbCheckStatus::NotConfigured => "not_configured",
            DbCheckStatus::Disconnected => "disconnected",
        }
    }
}

async fn database_check(state: &AppState) -> DbCheckStatus {
    let Some(pool) = state.db() else {
        return DbCheckStatus::NotConfigured;
    };

    let started = Instant::now();
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => DbCheckStatus::Connected {
            latency_ms: started.elapsed().as_millis() as u64,
        },
        Err(err) => {
            tracing::warn!(error = %err, "database health check failed");
            DbCheckStatus::Disconnected
        }
    }
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
