// apps/api/src/router.rs
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use scheduling_cell::{scheduling_routes, SchedulingState};

pub fn create_router(state: SchedulingState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(scheduling_routes(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "therapy-api"
    }))
}
