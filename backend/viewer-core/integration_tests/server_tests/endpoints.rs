use crate::helpers::{CountingBridge, poll, start_test_server, start_test_server_with};

use viewer_core::identity::{IdentityProvider, StaticIdentity};

use std::fs::{create_dir_all, write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Method, StatusCode};
use uuid::Uuid;

fn assert_cors(headers: &HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "*");
    assert_eq!(headers["access-control-allow-headers"], "*");
    assert_eq!(headers["access-control-max-age"], "86400");
}

/// **VALUE**: Verifies CORS preflight is answered for any path.
///
/// **WHY THIS MATTERS**: The web client is served from a public origin and talks to
/// `localhost`; without a 204 preflight the browser never sends the real request.
///
/// **BUG THIS CATCHES**: Would catch OPTIONS falling through to the file handler (404) or
/// returning a body.
#[tokio::test]
async fn given_any_path_when_options_then_returns_204_with_cors() {
    // GIVEN
    let test = start_test_server();
    let client = Client::new();

    for path in ["/api/has-changed", "/who_am_i", "/model.3dm", "/anything/else"] {
        // WHEN
        let response = client
            .request(Method::OPTIONS, test.url(path))
            .send()
            .await
            .expect("OPTIONS request");

        // THEN
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{path}");
        assert_cors(response.headers());
        assert!(response.bytes().await.expect("body").is_empty());
    }

    assert_eq!(test.bridge.count(), 0, "Preflight must not export");
}

/// **VALUE**: Verifies an existing file is served byte-for-byte.
///
/// **BUG THIS CATCHES**: Would catch text decoding of the binary artifact or a missing
/// content type.
#[tokio::test]
async fn given_existing_file_when_get_then_returns_exact_bytes() {
    // GIVEN: Binary content in the artifact directory
    let test = start_test_server();
    create_dir_all(&test.base_dir).expect("create base dir");
    let content: Vec<u8> = (0..=255).collect();
    write(test.base_dir.join("texture.bin"), &content).expect("write file");

    // WHEN
    let response = reqwest::get(test.url("/texture.bin")).await.expect("GET");

    // THEN
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(response.headers());
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(response.bytes().await.expect("body").as_ref(), content.as_slice());
}

/// **VALUE**: Verifies a missing file is a 404 that still carries CORS headers.
///
/// **WHY THIS MATTERS**: Without CORS on the 404 the browser reports a CORS failure and the
/// client cannot tell "not exported yet" from "server down".
#[tokio::test]
async fn given_missing_file_when_get_then_returns_404_with_cors() {
    // GIVEN
    let test = start_test_server();

    // WHEN
    let response = reqwest::get(test.url("/model1.3dm")).await.expect("GET");

    // THEN
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors(response.headers());
}

/// **VALUE**: Verifies files outside the artifact directory cannot be reached.
///
/// **WHY THIS MATTERS**: Any web page the user visits can talk to a loopback server.
/// Traversal here would expose the user's files.
///
/// **BUG THIS CATCHES**: Would catch joining a percent-decoded `../` onto the base directory.
#[tokio::test]
async fn given_traversal_request_when_get_then_returns_404() {
    // GIVEN: A secret next to (not inside) the artifact directory
    let test = start_test_server();
    create_dir_all(&test.base_dir).expect("create base dir");
    write(test.root.path().join("secret.txt"), b"secret").expect("write secret");

    for path in [
        "/..%2Fsecret.txt",
        "/..%2fsecret.txt",
        "/%2E%2E%2Fsecret.txt",
        "/..%5Csecret.txt",
        "/resources%2F..%2Fsecret.txt",
        "/%2e%2e",
    ] {
        // WHEN
        let response = reqwest::get(test.url(path)).await.expect("GET");

        // THEN
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

/// **VALUE**: Verifies `/who_am_i` returns the configured token as dashed text.
#[tokio::test]
async fn given_identity_when_who_am_i_then_returns_token() {
    // GIVEN
    let id = Uuid::new_v4();
    let identity: Arc<dyn IdentityProvider> = Arc::new(StaticIdentity(Some(id)));
    let test = start_test_server_with(CountingBridge::new(), Some(identity));

    // WHEN
    let response = reqwest::get(test.url("/who_am_i")).await.expect("GET");

    // THEN
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[CONTENT_TYPE]
            .to_str()
            .expect("header")
            .starts_with("text/plain")
    );
    assert_eq!(response.text().await.expect("body"), id.hyphenated().to_string());
}

/// **VALUE**: Verifies `/who_am_i` without a token is an empty 200, not an error.
#[tokio::test]
async fn given_no_identity_when_who_am_i_then_returns_empty_body() {
    // GIVEN
    let test = start_test_server();

    // WHEN
    let response = reqwest::get(test.url("/who_am_i")).await.expect("GET");

    // THEN
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), "");
}

/// **VALUE**: Verifies endpoint paths match regardless of ASCII case.
///
/// **BUG THIS CATCHES**: Would catch `/API/Has-Changed` being treated as a file name.
#[tokio::test]
async fn given_mixed_case_path_when_polling_then_routes_to_endpoint() {
    // GIVEN
    let test = start_test_server();

    // WHEN
    let response = reqwest::get(test.url("/API/Has-Changed")).await.expect("GET");

    // THEN
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), "false");
}

/// **VALUE**: Verifies write methods on file paths are refused.
#[tokio::test]
async fn given_post_to_file_path_when_requested_then_returns_405() {
    // GIVEN
    let test = start_test_server();

    // WHEN
    let response = Client::new()
        .post(test.url("/model.3dm"))
        .body("payload")
        .send()
        .await
        .expect("POST");

    // THEN
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_cors(response.headers());
}

/// **VALUE**: Verifies the server keeps serving after a bad request.
///
/// **WHY THIS MATTERS**: Requests are served one at a time on one worker; a failure that
/// escaped the handler would stop the viewer for the rest of the session.
#[tokio::test]
async fn given_bad_requests_when_followed_by_good_one_then_still_served() {
    // GIVEN
    let test = start_test_server();
    for path in ["/..%2F..%2Fetc%2Fpasswd", "/missing", "/%ZZ"] {
        let _ = reqwest::get(test.url(path)).await.expect("GET");
    }

    // WHEN
    let body = poll(test.port, false).await;

    // THEN
    assert_eq!(body, "false");
}

/// **VALUE**: Verifies an idle connection that never sends a request does not block polls.
///
/// **WHY THIS MATTERS**: Browsers open speculative preconnect sockets and may leave them
/// silent. Connections are served one at a time, so a silent socket that is never timed
/// out would hang every poll and file request behind it.
///
/// **BUG THIS CATCHES**: Would catch serving a connection without a header read deadline.
#[tokio::test]
async fn given_idle_connection_open_when_polling_then_still_served() {
    // GIVEN: A raw connection that never writes, queued ahead of the poll
    let test = start_test_server();
    let _idle = TcpStream::connect(("127.0.0.1", test.port)).expect("open idle socket");
    let client = Client::builder()
        .timeout(Duration::from_secs(8))
        .build()
        .expect("client");

    // WHEN
    let started = Instant::now();
    let response = client
        .get(test.url("/api/has-changed"))
        .send()
        .await
        .expect("poll behind an idle socket");

    // THEN
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), "false");
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "Poll waited {:?} behind the idle socket",
        started.elapsed()
    );
}
