use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use crate::docs::ApiDoc;
use axum::Router;
use axum::routing::get;
use crate::state::AppState;

use tower_http::cors::{Any, CorsLayer};

pub const HEALTH_MESSAGE: &str = "✅ MP4 Autoplay Server is running!";

pub fn configure_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(health))
        .merge(crate::modules::convert::router())
        .merge(crate::modules::media::router())
        .layer(cors)
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Server is up", body = String)
    ),
    tag = "Health"
)]
pub async fn health() -> &'static str {
    HEALTH_MESSAGE
}
