use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::engine::EngineMode;
use crate::view::Scene;
use crate::web::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub mode: EngineMode,
    pub ready: bool,
    pub radius_m: u32,
    pub render_failures: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RadiusRequest {
    pub radius_m: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RadiusResponse {
    pub radius_m: u32,
}

#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Engine status", body = StatusResponse)
    ),
    tag = "engine"
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let engine = state.engine.lock().await;
    let status = engine.status();
    Json(StatusResponse {
        ready: status.mode == EngineMode::Ready,
        mode: status.mode,
        radius_m: status.radius_m,
        render_failures: status.render_failures,
    })
}

#[utoipa::path(
    get,
    path = "/api/scene",
    responses(
        (status = 200, description = "Latest scene, or null while loading", body = Option<Scene>)
    ),
    tag = "engine"
)]
pub async fn scene(State(state): State<AppState>) -> Json<Option<Scene>> {
    let engine = state.engine.lock().await;
    Json(engine.status().scene)
}

#[utoipa::path(
    get,
    path = "/api/map",
    responses(
        (status = 200, description = "GeoJSON surface document, or null while loading")
    ),
    tag = "engine"
)]
pub async fn map(State(state): State<AppState>) -> Json<serde_json::Value> {
    let engine = state.engine.lock().await;
    Json(engine.map_snapshot().unwrap_or(serde_json::Value::Null))
}

// Out-of-range requests are clamped, never rejected.
#[utoipa::path(
    post,
    path = "/api/radius",
    request_body = RadiusRequest,
    responses(
        (status = 200, description = "Effective (clamped) radius", body = RadiusResponse)
    ),
    tag = "engine"
)]
pub async fn set_radius(
    State(state): State<AppState>,
    Json(request): Json<RadiusRequest>,
) -> Json<RadiusResponse> {
    let engine = state.engine.lock().await;
    Json(RadiusResponse {
        radius_m: engine.set_radius(request.radius_m),
    })
}
