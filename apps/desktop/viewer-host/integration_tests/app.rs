use viewer_host::app::{build_server, ensure_identity};

use viewer_core::change_tracker::ChangeTracker;
use viewer_core::config::ViewerConfig;

use std::fs::{read, write};
use std::net::TcpListener;

use tempfile::TempDir;
use uuid::Uuid;

fn config_in(root: &TempDir) -> ViewerConfig {
    let port = TcpListener::bind(("127.0.0.1", 0))
        .expect("bind")
        .local_addr()
        .expect("addr")
        .port();

    let mut config = ViewerConfig::default();
    config.server.base_port = port;
    config.server.port_window = 8;
    config.export.base_dir = Some(root.path().join("resources"));
    config
}

/// **VALUE**: Verifies a first run generates an identity and persists it.
///
/// **WHY THIS MATTERS**: `/who_am_i` must return the same token across restarts so the web
/// client can recognize the same host.
///
/// **BUG THIS CATCHES**: Would catch generating a new token on every start.
#[test]
fn given_no_identity_when_ensured_then_generated_and_persisted() {
    // GIVEN
    let dir = TempDir::new().expect("temp dir");
    let mut config = ViewerConfig::default();

    // WHEN
    let identity = ensure_identity(&mut config, dir.path());

    // THEN
    assert!(!identity.is_nil());
    let reloaded = ViewerConfig::load(dir.path()).expect("reload");
    assert_eq!(reloaded.identity, Some(identity));

    let mut reloaded = reloaded;
    assert_eq!(ensure_identity(&mut reloaded, dir.path()), identity);
}

/// **VALUE**: Verifies a configured identity is used as-is.
#[test]
fn given_configured_identity_when_ensured_then_unchanged() {
    let dir = TempDir::new().expect("temp dir");
    let id = Uuid::new_v4();
    let mut config = ViewerConfig {
        identity: Some(id),
        ..ViewerConfig::default()
    };

    assert_eq!(ensure_identity(&mut config, dir.path()), id);
    assert!(!dir.path().join("viewer.json").exists(), "Nothing to persist");
}

/// **VALUE**: Verifies the harness server exports the source file into the configured layout.
///
/// **BUG THIS CATCHES**: Would catch config values (window, base dir) not reaching the
/// server, or the file-copy bridge copying the wrong file.
#[test]
fn given_config_and_source_when_server_built_then_exports_source_copy() {
    // GIVEN
    let root = TempDir::new().expect("temp dir");
    let source = root.path().join("document.3dm");
    write(&source, b"document v1").expect("write source");
    let config = config_in(&root);

    let mut server = build_server(&config, &source, ChangeTracker::new(), Uuid::new_v4())
        .expect("build server");

    // WHEN
    let port = server.start().expect("start");
    let artifact = server.export_now().expect("export");

    // THEN
    assert!(port >= config.server.base_port);
    assert_eq!(server.port_window(), config.port_window());
    assert_eq!(
        artifact,
        root.path().join("resources").join(format!("model{port}.3dm"))
    );
    assert_eq!(read(&artifact).expect("artifact"), b"document v1");

    server.stop();
}
