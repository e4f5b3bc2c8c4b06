//! Public site handlers: index, favicon, assets and the honeypot.

use std::path::{Component, Path as FsPath};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Method, Request, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};

use crate::http::request::{peer_addr, request_id};
use crate::http::response::{error_page, serve_file};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::audit::{AuditEvent, AuditRecord};

const HONEYPOT_BODY: &str = "<h1>Access Denied</h1><p>This area is monitored.</p>";

pub async fn index(State(state): State<AppState>) -> Response {
    serve_file(&state.static_dir, "index.html").await
}

pub async fn favicon(State(state): State<AppState>) -> Response {
    for candidate in ["favicon.ico", "favicon/favicon.ico"] {
        let is_file = tokio::fs::metadata(state.static_dir.join(candidate))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if is_file {
            return serve_file(&state.static_dir, candidate).await;
        }
    }
    error_page(&state.static_dir, StatusCode::NOT_FOUND).await
}

/// Decoy path: always 403, always audited.
pub async fn honeypot(State(state): State<AppState>, request: Request<Body>) -> Response {
    let headers = request.headers();
    let identity = state
        .guard
        .identifier()
        .identify(headers, peer_addr(&request));
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let record = AuditRecord::new(AuditEvent::HoneypotHit, identity, request.uri().path())
        .with_user_agent(user_agent)
        .with_request_id(request_id(headers));
    state.guard.audit().record(&record);
    metrics::record_honeypot_hit();

    (StatusCode::FORBIDDEN, Html(HONEYPOT_BODY)).into_response()
}

/// `/static/{*path}`
pub async fn static_asset(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    if !is_safe_relative(&path) {
        return error_page(&state.static_dir, StatusCode::BAD_REQUEST).await;
    }
    serve_file(&state.static_dir, &path).await
}

/// Everything no other route claimed.
///
/// Serves top-level files from the static directory but refuses direct
/// requests for HTML pages other than the index.
pub async fn fallback(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return error_page(&state.static_dir, StatusCode::METHOD_NOT_ALLOWED).await;
    }

    let path = uri.path().strip_prefix('/').unwrap_or(uri.path());
    if path.is_empty() || path == "index.html" {
        return serve_file(&state.static_dir, "index.html").await;
    }
    if !is_safe_relative(path) || path.ends_with(".html") {
        return error_page(&state.static_dir, StatusCode::BAD_REQUEST).await;
    }
    serve_file(&state.static_dir, path).await
}

/// A relative path made only of normal components, with no `..` anywhere.
pub fn is_safe_relative(path: &str) -> bool {
    if path.is_empty() || path.starts_with('/') || path.contains("..") || path.contains('\\') {
        return false;
    }
    FsPath::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}
