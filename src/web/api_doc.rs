use utoipa::OpenApi;

use super::api::engine::{RadiusRequest, RadiusResponse, StatusResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::engine::status,
        super::api::engine::scene,
        super::api::engine::map,
        super::api::engine::set_radius,
    ),
    components(
        schemas(
            StatusResponse,
            RadiusRequest,
            RadiusResponse,
            crate::engine::EngineMode,
            crate::view::Scene,
            crate::view::ViewState,
            crate::view::GeoFence,
            crate::view::Marker,
            crate::geo::Coordinate,
        )
    ),
    info(
        title = "Satwatch API",
        description = "Ground station and satellite tracking scene feed",
        version = "0.1.0"
    ),
    tags(
        (name = "engine", description = "Tracking engine status and control")
    )
)]
pub struct ApiDoc;
