//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use static_gate::config::GateConfig;
use static_gate::http::HttpServer;
use static_gate::lifecycle::Shutdown;
use static_gate::security::credentials::hash_password;
use static_gate::security::{AccessGuard, MemoryAuditSink};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// bcrypt at the minimum cost, computed once per test binary.
pub fn test_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(ADMIN_PASSWORD, 4).unwrap())
        .clone()
}

/// A running server over a temporary static directory.
#[allow(dead_code)]
pub struct TestSite {
    pub addr: SocketAddr,
    pub dir: TempDir,
    pub guard: Arc<AccessGuard>,
    pub audit: Arc<MemoryAuditSink>,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestSite {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET `/admin` as `client_ip` (via X-Forwarded-For from the loopback peer).
    pub async fn admin(&self, client_ip: &str, password: Option<&str>) -> reqwest::Response {
        let mut request = self
            .client
            .get(self.url("/admin"))
            .header("x-forwarded-for", client_ip);
        if let Some(password) = password {
            request = request.basic_auth(ADMIN_USER, Some(password));
        }
        request.send().await.unwrap()
    }
}

impl Drop for TestSite {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Write a small site into a fresh temp directory.
pub fn write_site() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Home</h1>").unwrap();
    std::fs::write(dir.path().join("admin.html"), "<h1>Admin Panel</h1>").unwrap();
    std::fs::write(dir.path().join("about.html"), "<h1>About</h1>").unwrap();
    std::fs::write(dir.path().join("robots.txt"), "User-agent: *").unwrap();
    std::fs::create_dir_all(dir.path().join("css")).unwrap();
    std::fs::write(dir.path().join("css/site.css"), "body{}").unwrap();
    dir
}

/// Start a server on an ephemeral port with `configure` applied to the defaults.
pub async fn start_site<F>(configure: F) -> TestSite
where
    F: FnOnce(&mut GateConfig),
{
    let dir = write_site();

    let mut config = GateConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.site.static_dir = dir.path().to_string_lossy().into_owned();
    config.admin.password_hash = Some(test_hash());
    config.observability.audit_log_file = None;
    configure(&mut config);

    let audit = Arc::new(MemoryAuditSink::new());
    let guard = Arc::new(AccessGuard::from_config(&config).with_audit_sink(audit.clone()));

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let (_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::with_guard(config, guard.clone());
    tokio::spawn(async move {
        server.run(listener, config_updates, rx).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap();

    TestSite {
        addr,
        dir,
        guard,
        audit,
        client,
        shutdown,
    }
}
