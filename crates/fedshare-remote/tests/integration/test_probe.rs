//! Integration tests for HttpRemoteTransport::probe()

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fedshare_core::ports::IRemoteTransport;

use crate::common;

#[tokio::test]
async fn test_probe_installed_remote() {
    let server = common::setup_status_mock(common::installed_status()).await;

    let status = common::transport()
        .probe(&server.uri())
        .await
        .expect("probe failed");

    assert!(status.reachable);
    assert!(status.installed);
    assert_eq!(status.version.as_deref(), Some("27.1.0"));
    assert!(status.is_available());
}

#[tokio::test]
async fn test_probe_not_installed_remote() {
    let server = common::setup_status_mock(serde_json::json!({
        "installed": false,
        "version": "27.1.0.7"
    }))
    .await;

    let status = common::transport().probe(&server.uri()).await.unwrap();

    assert!(status.reachable);
    assert!(!status.installed);
    assert_eq!(status.version.as_deref(), Some("27.1.0.7"));
    assert!(!status.is_available());
}

#[tokio::test]
async fn test_probe_under_subpath() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nextcloud/status.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::installed_status()))
        .expect(1)
        .mount(&server)
        .await;

    let remote = format!("{}/nextcloud", server.uri());
    let status = common::transport().probe(&remote).await.unwrap();
    assert!(status.is_available());
}

#[tokio::test]
async fn test_probe_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status.php"))
        .and(header("user-agent", "fedshare-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::installed_status()))
        .expect(1)
        .mount(&server)
        .await;

    let status = common::transport().probe(&server.uri()).await.unwrap();
    assert!(status.reachable);
}

#[tokio::test]
async fn test_probe_error_status_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status.php"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let status = common::transport().probe(&server.uri()).await.unwrap();
    assert!(!status.reachable);
    assert!(!status.is_available());
}

#[tokio::test]
async fn test_probe_missing_status_page_is_unreachable() {
    // No mocks mounted: wiremock answers 404
    let server = MockServer::start().await;

    let status = common::transport().probe(&server.uri()).await.unwrap();
    assert!(!status.reachable);
}

#[tokio::test]
async fn test_probe_connection_refused_is_unreachable() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let status = common::transport().probe(&uri).await.unwrap();
    assert!(!status.reachable);
}

#[tokio::test]
async fn test_probe_malformed_body_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let result = common::transport().probe(&server.uri()).await;
    assert!(result.is_err());
}
