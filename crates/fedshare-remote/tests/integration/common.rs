//! Shared test helpers for remote transport integration tests
//!
//! Each helper mounts a `status.php` endpoint and returns a transport
//! pointing at the mock server.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fedshare_core::config::RemoteConfig;
use fedshare_remote::HttpRemoteTransport;

/// Transport with a short timeout suitable for tests
pub fn transport() -> HttpRemoteTransport {
    let config = RemoteConfig {
        timeout_secs: 2,
        user_agent: "fedshare-test/1.0".to_string(),
    };
    HttpRemoteTransport::new(&config).expect("build transport")
}

/// Starts a mock server whose `status.php` answers with `body`
pub async fn setup_status_mock(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    server
}

/// Status document of a healthy installation
pub fn installed_status() -> serde_json::Value {
    serde_json::json!({
        "installed": true,
        "maintenance": false,
        "needsDbUpgrade": false,
        "version": "27.1.0.7",
        "versionstring": "27.1.0",
        "edition": "",
        "productname": "Nextcloud"
    })
}
