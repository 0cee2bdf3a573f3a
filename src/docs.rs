use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::modules::convert::handler::convert,
        crate::modules::media::stream_handler::stream_asset,
    ),
    components(
        schemas(
            crate::modules::convert::dto::ConvertRequest,
            crate::common::response::ConvertResponse,
            crate::common::response::ErrorResponse,
        )
    ),
    tags(
        (name = "Convert", description = "Download and transcode remote videos"),
        (name = "Media", description = "Range-aware delivery of converted videos"),
        (name = "Health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;
