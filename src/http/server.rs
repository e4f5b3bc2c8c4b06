//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, headers)
//! - Put the access guard in front of the admin area
//! - Apply credential updates from the config watcher
//! - Serve over plain TCP or TLS until shutdown

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::GateConfig;
use crate::http::request::MakeRequestUuidV4;
use crate::http::site;
use crate::security::credentials::AdminCredentials;
use crate::security::guard::AccessGuard;
use crate::security::headers::apply_security_headers;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<AccessGuard>,
    pub static_dir: Arc<PathBuf>,
}

/// HTTP server for the static site and its admin area.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
    guard: Arc<AccessGuard>,
}

impl HttpServer {
    /// Create a server from a validated configuration.
    pub fn new(config: GateConfig) -> Self {
        let guard = Arc::new(AccessGuard::from_config(&config));
        Self::with_guard(config, guard)
    }

    /// Create a server around an existing guard (custom audit sink, shared state).
    pub fn with_guard(config: GateConfig, guard: Arc<AccessGuard>) -> Self {
        let state = AppState {
            guard: guard.clone(),
            static_dir: Arc::new(PathBuf::from(&config.site.static_dir)),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            guard,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GateConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/", get(site::index))
            .route("/favicon.ico", get(site::favicon))
            .route(&config.site.honeypot_path, get(site::honeypot))
            .route("/static/{*path}", get(site::static_asset))
            .route("/assets/{*path}", get(site::static_asset))
            .merge(setup_admin_router(state.clone()))
            .fallback(site::fallback)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::REQUEST_TIMEOUT,
                        Duration::from_secs(config.timeouts.request_secs),
                    )),
            );

        if config.security.enable_headers {
            apply_security_headers(router)
        } else {
            router
        }
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn guard(&self) -> Arc<AccessGuard> {
        self.guard.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Run the server on a plain TCP listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GateConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        spawn_config_applier(self.guard.clone(), config_updates);

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<GateConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        spawn_config_applier(self.guard.clone(), config_updates);

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(
                self.router
                    .into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Swap in reloaded admin credentials. Abuse-control state is kept.
fn spawn_config_applier(
    guard: Arc<AccessGuard>,
    mut config_updates: mpsc::UnboundedReceiver<GateConfig>,
) {
    tokio::spawn(async move {
        while let Some(config) = config_updates.recv().await {
            guard
                .verifier()
                .replace(AdminCredentials::from_config(&config.admin));
        }
    });
}
