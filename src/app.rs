use crate::handlers;
use crate::state::SharedState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

/// Portraits arrive as base64 data URLs. The page downscales before
/// uploading, but a raw photo from another client still has to fit.
pub const IMAGE_BODY_LIMIT: usize = 16 * 1024 * 1024;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/state", get(handlers::get_state))
        .route("/api/tabs", post(handlers::create_tab))
        .route("/api/tabs/:id/activate", post(handlers::switch_tab))
        .route("/api/tabs/:id/rename", post(handlers::rename_tab))
        .route("/api/tabs/:id/delete", post(handlers::delete_tab))
        .route("/api/tabs/:id/delete/confirm", post(handlers::confirm_delete_tab))
        .route("/api/bars", post(handlers::create_bar))
        .route("/api/bars/reorder", post(handlers::reorder_bars))
        .route("/api/bars/:id/life", post(handlers::edit_life))
        .route("/api/bars/:id/max-life", post(handlers::edit_max_life))
        .route("/api/bars/:id/rename", post(handlers::rename_bar))
        .route(
            "/api/bars/:id/image",
            post(handlers::set_image).layer(DefaultBodyLimit::max(IMAGE_BODY_LIMIT)),
        )
        .route("/api/bars/:id/image/clear", post(handlers::clear_image))
        .route("/api/bars/:id/delete", post(handlers::delete_bar))
        .with_state(state)
}
