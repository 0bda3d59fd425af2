//! Router harness over a migrated in-memory database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;

use pocketbook_api::{AppState, create_router};
use pocketbook_db::LedgerSentinels;
use pocketbook_db::migration::Migrator;
use pocketbook_shared::{DatabaseConfig, LedgerConfig};

pub const VARIABLE: i32 = 2;
pub const INCOME: i32 = 3;
pub const OTHER: i32 = 1;

pub async fn app() -> Router {
    let db = pocketbook_db::connect(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    let sentinels = LedgerSentinels::resolve(&db, &LedgerConfig::default())
        .await
        .expect("Failed to resolve sentinels");

    create_router(AppState {
        db: Arc::new(db),
        sentinels,
        default_list_limit: 50,
    })
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).expect("serializable body"))
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).expect("valid request"))
        .await
        .expect("router is infallible");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("readable body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        other => other.to_string().parse().expect("decimal number"),
    }
}
