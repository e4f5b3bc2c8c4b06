use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::http::request::peer_addr;
use crate::http::server::AppState;

/// Route layer putting the access guard in front of admin handlers.
pub async fn admin_gate_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ctx = state
        .guard
        .context(request.headers(), peer_addr(&request), request.uri().path());

    let mut response = match state.guard.protect(&ctx, move || next.run(request)).await {
        Ok(response) => response,
        Err(denial) => state.guard.reject(denial),
    };

    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
