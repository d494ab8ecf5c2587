use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::engine::Engine;
use crate::feed::{HttpPositionSource, PositionFeed};
use crate::render::GeoJsonSurface;
use crate::view::ViewController;

use super::api::engine as engine_handlers;
use super::api_doc::ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<Engine>>,
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();

    let client = reqwest::Client::builder()
        .timeout(config.sources.timeout)
        .build()
        .map_err(std::io::Error::other)?;
    let feed = PositionFeed::new(
        HttpPositionSource::new(client.clone(), config.sources.ground_station.clone()),
        HttpPositionSource::new(client, config.sources.satellite.clone()),
    );
    let controller = ViewController::new(GeoJsonSurface::new(), config.fence.default_radius_m);

    let mut engine = Engine::new(config.fence.default_radius_m);
    engine
        .start(feed, controller, config.sources.poll_interval)
        .map_err(std::io::Error::other)?;

    let state = AppState {
        engine: Arc::new(Mutex::new(engine)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // Engine API endpoints
        .route("/api/status", get(engine_handlers::status))
        .route("/api/scene", get(engine_handlers::scene))
        .route("/api/map", get(engine_handlers::map))
        .route("/api/radius", post(engine_handlers::set_radius))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
