//! Error pages and file responses.
//!
//! Error bodies come from `<static_dir>/<code>.html` when the site ships
//! one, otherwise a short plain-text message.

use std::io::ErrorKind;
use std::path::Path;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// Serve `relative` from `static_dir`, or the matching error page.
pub async fn serve_file(static_dir: &Path, relative: &str) -> Response {
    let path = static_dir.join(relative);

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return error_page(static_dir, StatusCode::NOT_FOUND).await,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return error_page(static_dir, StatusCode::NOT_FOUND).await;
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to stat file");
            return error_page(static_dir, StatusCode::INTERNAL_SERVER_ERROR).await;
        }
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(content_type_for(relative)),
            );
            response
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to read file");
            error_page(static_dir, StatusCode::INTERNAL_SERVER_ERROR).await
        }
    }
}

/// Render the error page for `status`.
pub async fn error_page(static_dir: &Path, status: StatusCode) -> Response {
    let page = static_dir.join(format!("{}.html", status.as_u16()));
    if let Ok(body) = tokio::fs::read(&page).await {
        let mut response = (status, Body::from(body)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        return response;
    }

    let text = match status {
        StatusCode::BAD_REQUEST => "Bad request",
        StatusCode::NOT_FOUND => "Not Found",
        StatusCode::METHOD_NOT_ALLOWED => "Method Not Allowed",
        _ => "Internal Server Error",
    };
    (status, text).into_response()
}

/// Content type by file extension.
pub fn content_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
