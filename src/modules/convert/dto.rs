use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ConvertRequest {
    /// Remote video to convert.
    #[validate(
        required(message = "Missing URL"),
        length(min = 1, message = "Missing URL")
    )]
    #[schema(example = "https://example.com/a.mp4")]
    pub url: Option<String>,
}
