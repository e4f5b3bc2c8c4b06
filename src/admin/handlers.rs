use axum::{extract::State, response::Response};

use crate::http::response::serve_file;
use crate::http::server::AppState;

/// The protected admin page.
pub async fn admin_page(State(state): State<AppState>) -> Response {
    serve_file(&state.static_dir, "admin.html").await
}
