use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub mod range;
pub mod stream_handler;

pub fn router() -> Router<AppState> {
    Router::new().route("/{file_name}", get(stream_handler::stream_asset))
}
