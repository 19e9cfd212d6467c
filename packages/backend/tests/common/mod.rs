use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use learntwin_algo::{BktParams, ItemRecord};
use learntwin_backend::routes;
use learntwin_backend::services::mastery::MasteryService;
use learntwin_backend::state::AppState;

pub fn sample_catalog() -> Vec<ItemRecord> {
    vec![
        ItemRecord::new("i1", "add").with_metadata("difficulty", json!(0.4)),
        ItemRecord::new("i2", "add").with_metadata("difficulty", json!(0.6)),
        ItemRecord::new("i3", "sub").with_metadata("difficulty", json!(0.7)),
    ]
}

pub fn create_test_app() -> Router {
    create_test_app_with(None, None)
}

pub fn create_test_app_with(db: Option<SqlitePool>, api_key: Option<String>) -> Router {
    let mastery = Arc::new(MasteryService::new(BktParams::default(), sample_catalog()));
    routes::router(AppState::new(mastery, db, api_key))
}

pub async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
