pub mod health;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{outputs, script, video, voice};
use crate::state::AppState;

/// Pipeline and artifact routes, mounted at the root.
///
/// ```text
/// POST   /generate_script/          generate a script from a topic
/// POST   /upload_script/            store an uploaded .txt/.md script
/// POST   /generate_voice/           synthesize speech from text
/// POST   /create_video/             animate a script and encode the video
/// GET    /list_outputs/             list artifacts
/// DELETE /delete_file/{filename}    delete one artifact
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/generate_script/", post(script::generate_script))
        .route("/upload_script/", post(script::upload_script))
        .route("/generate_voice/", post(voice::generate_voice))
        .route("/create_video/", post(video::create_video))
        .route("/list_outputs/", get(outputs::list_outputs))
        .route("/delete_file/{filename}", delete(outputs::delete_file))
}
