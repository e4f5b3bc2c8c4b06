pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::admin_gate_middleware;
use self::handlers::admin_page;
use crate::http::server::AppState;

/// Admin routes, each behind the access guard.
pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_page))
        .route_layer(middleware::from_fn_with_state(state, admin_gate_middleware))
}
