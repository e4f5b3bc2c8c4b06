//! End-to-end behavior of the guarded admin area.

use reqwest::StatusCode;
use static_gate::security::AuditEvent;

mod common;
use common::{start_site, ADMIN_PASSWORD};

#[tokio::test]
async fn test_admin_requires_credentials() {
    let site = start_site(|_| {}).await;

    let response = site.admin("203.0.113.1", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()["www-authenticate"],
        "Basic realm=\"Admin Area\""
    );
    assert_eq!(response.headers()["cache-control"], "no-store");
    assert_eq!(response.text().await.unwrap(), "Authentication required");

    assert_eq!(site.audit.events(), vec![AuditEvent::AuthChallenge]);
}

#[tokio::test]
async fn test_admin_serves_page_with_valid_credentials() {
    let site = start_site(|_| {}).await;

    let response = site.admin("203.0.113.2", Some(ADMIN_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "<h1>Admin Panel</h1>");

    let records = site.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].event, AuditEvent::LoginSuccess);
    assert_eq!(records[0].identity, "203.0.113.2");
    assert_eq!(records[0].username.as_deref(), Some("admin"));
    assert!(records[0].request_id.is_some());
}

#[tokio::test]
async fn test_wrong_password_is_challenged() {
    let site = start_site(|_| {}).await;

    let response = site.admin("203.0.113.3", Some("nope")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("www-authenticate"));
    assert_eq!(response.text().await.unwrap(), "Invalid credentials");
    assert_eq!(site.guard.store().failure_count("203.0.113.3"), 1);
}

#[tokio::test]
async fn test_lockout_blocks_even_correct_credentials() {
    let site = start_site(|_| {}).await;
    let ip = "198.51.100.7";

    for _ in 0..5 {
        let response = site.admin(ip, Some("wrong")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = site.admin(ip, Some(ADMIN_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!response.headers().contains_key("www-authenticate"));
    assert_eq!(
        response.text().await.unwrap(),
        "Temporarily blocked due to repeated failed attempts."
    );

    let events = site.audit.events();
    assert!(events.contains(&AuditEvent::Lockout));
    assert_eq!(events.last(), Some(&AuditEvent::LockedAttempt));

    // Other clients are unaffected.
    let response = site.admin("198.51.100.8", Some(ADMIN_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_applies_before_credentials() {
    let site = start_site(|_| {}).await;
    let ip = "192.0.2.50";

    for _ in 0..15 {
        let response = site.admin(ip, Some(ADMIN_PASSWORD)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = site.admin(ip, Some(ADMIN_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.text().await.unwrap(), "Too many requests");
    assert_eq!(site.audit.events().last(), Some(&AuditEvent::RateLimit));
}

#[tokio::test]
async fn test_untrusted_peer_cannot_spoof_identity() {
    let site = start_site(|config| {
        config.proxy.trusted_proxies = vec!["10.0.0.1".into()];
    })
    .await;

    site.admin("203.0.113.99", None).await;

    let records = site.audit.records();
    assert_eq!(records[0].identity, "127.0.0.1");
    assert!(!site.guard.store().contains("203.0.113.99"));
}

#[tokio::test]
async fn test_honeypot_is_forbidden_and_audited() {
    let site = start_site(|_| {}).await;

    let response = site
        .client
        .get(site.url("/secret-honeypot"))
        .header("x-forwarded-for", "203.0.113.66")
        .header("user-agent", "scanner/1.0")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.text().await.unwrap().contains("This area is monitored."));

    let records = site.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].event, AuditEvent::HoneypotHit);
    assert_eq!(records[0].identity, "203.0.113.66");
    assert_eq!(records[0].user_agent.as_deref(), Some("scanner/1.0"));
}

#[tokio::test]
async fn test_honeypot_path_is_configurable() {
    let site = start_site(|config| {
        config.site.honeypot_path = "/wp-login.php".into();
    })
    .await;

    let response = site.client.get(site.url("/wp-login.php")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = site.client.get(site.url("/secret-honeypot")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
