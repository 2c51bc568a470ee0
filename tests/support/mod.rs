//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::net::TcpListener;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Starts a mock server, or returns `None` (after logging) when localhost
/// sockets are unavailable. Set `FTCR_REQUIRE_SOCKET_TESTS=1` to panic instead.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return Some(MockServer::start().await);
    }

    let required = std::env::var("FTCR_REQUIRE_SOCKET_TESTS")
        .is_ok_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
    assert!(
        !required,
        "[socket-bound-test] cannot bind localhost socket and FTCR_REQUIRE_SOCKET_TESTS is set"
    );
    eprintln!("[socket-bound-test] cannot bind localhost socket; skipping wiremock test");
    None
}

/// Serves `body` at `route` with status 200.
pub async fn mount_image(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Serves `body` at `route` after `delay`, expecting exactly `hits` requests.
pub async fn mount_slow_image(
    server: &MockServer,
    route: &str,
    body: &[u8],
    delay: Duration,
    hits: u64,
) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .set_delay(delay),
        )
        .expect(hits)
        .mount(server)
        .await;
}

/// Serves an HTML page at `route`.
pub async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Answers `route` with `status` and an empty body.
pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// `host:port` of the server, without scheme, as a user would type it.
pub fn authority(server: &MockServer) -> String {
    server.address().to_string()
}
