//! Partner-facing transport pricing service.

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod pricing;

use axum::{extract::State, routing::get, Json, Router};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::cache::AppCache;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    /// Base rate for preview scenarios that do not carry their own
    pub preview_base_rate: Decimal,
}

impl AppState {
    pub fn new(db: PgPool, cache: AppCache, preview_base_rate: Decimal) -> Self {
        Self {
            db,
            cache,
            preview_base_rate,
        }
    }
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", pricing::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "cache": state.cache.stats(),
    }))
}
