use viewer_core::connectivity::{
    AlwaysOnline, ConnectivityChecker, DEFAULT_PROBE_URL, HttpConnectivityChecker,
};

use std::net::TcpListener;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROBE_PATH: &str = "/generate_204";

async fn probe_server(status: u16, delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROBE_PATH))
        .respond_with(ResponseTemplate::new(status).set_delay(delay))
        .mount(&server)
        .await;
    server
}

/// **VALUE**: Verifies a 204 from the probe URL means online.
#[tokio::test]
async fn given_probe_returns_204_when_checking_then_online() {
    // GIVEN
    let server = probe_server(204, Duration::ZERO).await;
    let checker = HttpConnectivityChecker::new(
        format!("{}{PROBE_PATH}", server.uri()),
        Duration::from_secs(2),
    );

    // WHEN / THEN
    assert!(checker.is_online().await);
}

/// **VALUE**: Verifies an error status means offline.
///
/// **WHY THIS MATTERS**: Captive portals and proxies answer with their own status codes;
/// only a success proves the internet is reachable.
#[tokio::test]
async fn given_probe_returns_500_when_checking_then_offline() {
    // GIVEN
    let server = probe_server(500, Duration::ZERO).await;
    let checker = HttpConnectivityChecker::new(
        format!("{}{PROBE_PATH}", server.uri()),
        Duration::from_secs(2),
    );

    // WHEN / THEN
    assert!(!checker.is_online().await);
}

/// **VALUE**: Verifies a refused connection means offline instead of an error.
#[tokio::test]
async fn given_unreachable_probe_when_checking_then_offline() {
    // GIVEN: A port nothing listens on
    let port = {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let checker = HttpConnectivityChecker::new(
        format!("http://127.0.0.1:{port}{PROBE_PATH}"),
        Duration::from_secs(2),
    );

    // WHEN / THEN
    assert!(!checker.is_online().await);
}

/// **VALUE**: Verifies the probe gives up after its timeout.
///
/// **BUG THIS CATCHES**: Would catch a missing request timeout hanging activation on a
/// black-holed network.
#[tokio::test]
async fn given_slow_probe_when_checking_then_times_out_offline() {
    // GIVEN
    let server = probe_server(204, Duration::from_secs(2)).await;
    let checker = HttpConnectivityChecker::new(
        format!("{}{PROBE_PATH}", server.uri()),
        Duration::from_millis(200),
    );

    // WHEN
    let started = std::time::Instant::now();
    let online = checker.is_online().await;

    // THEN
    assert!(!online);
    assert!(started.elapsed() < Duration::from_secs(2));
}

/// **VALUE**: Verifies the defaults point at the public 204 endpoint.
#[tokio::test]
async fn given_defaults_when_constructed_then_uses_generate_204() {
    assert_eq!(
        HttpConnectivityChecker::default().probe_url(),
        DEFAULT_PROBE_URL
    );
    assert!(DEFAULT_PROBE_URL.ends_with(PROBE_PATH));
    assert!(AlwaysOnline.is_online().await);
}
