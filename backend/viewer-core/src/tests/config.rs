use crate::activation::LaunchMode;
use crate::config::ViewerConfig;
use crate::error::config::ConfigError;
use crate::port::PortWindow;

use std::fs::write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use uuid::Uuid;

/// **VALUE**: Verifies a missing config file yields the documented defaults.
///
/// **WHY THIS MATTERS**: First launch has no config; it must still start on 8469 with the
/// `model<port>.3dm` layout.
///
/// **BUG THIS CATCHES**: Would catch treating "file not found" as an error.
#[test]
fn given_missing_file_when_loading_then_returns_defaults() {
    // GIVEN
    let dir = TempDir::new().expect("temp dir");

    // WHEN
    let config = ViewerConfig::load(dir.path()).expect("defaults");

    // THEN
    assert_eq!(config, ViewerConfig::default());
    assert_eq!(config.port_window(), PortWindow::new(8469, 30));
    assert_eq!(config.probe_timeout(), Duration::from_secs(5));
    assert!(config.connectivity.enabled);
    assert_eq!(
        config.artifact_layout().artifact_file_name(8469),
        "model8469.3dm"
    );
}

/// **VALUE**: Verifies saved values come back unchanged.
///
/// **BUG THIS CATCHES**: Would catch a field missing from serialization, or the temp file
/// not being renamed into place.
#[test]
fn given_custom_config_when_saved_and_loaded_then_values_preserved() {
    // GIVEN
    let dir = TempDir::new().expect("temp dir");
    let mut config = ViewerConfig::default();
    config.server.base_port = 9100;
    config.server.port_window = 5;
    config.export.base_dir = Some(PathBuf::from("/tmp/snapshots"));
    config.export.file_stem = String::from("scene");
    config.export.extension = String::from("glb");
    config.launch.mode = Some(LaunchMode::ExternalBrowser);
    config.identity = Some(Uuid::new_v4());

    // WHEN
    config.save(dir.path()).expect("save");
    let loaded = ViewerConfig::load(dir.path()).expect("load");

    // THEN
    assert_eq!(loaded, config);
    assert_eq!(loaded.launch_mode(), LaunchMode::ExternalBrowser);
    assert!(!dir.path().join("viewer.json.tmp").exists());
}

/// **VALUE**: Verifies partial files fill the missing fields with defaults.
///
/// **WHY THIS MATTERS**: Users edit the file by hand and only set what they care about.
#[test]
fn given_partial_json_when_loading_then_missing_fields_defaulted() {
    // GIVEN
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path().join("viewer.json"),
        r#"{ "server": { "base_port": 9000 }, "launch": { "mode": "embedded_view" } }"#,
    )
    .expect("write config");

    // WHEN
    let config = ViewerConfig::load(dir.path()).expect("load");

    // THEN
    assert_eq!(config.server.base_port, 9000);
    assert_eq!(config.server.port_window, 30);
    assert_eq!(config.export.extension, "3dm");
    assert_eq!(config.launch_mode(), LaunchMode::EmbeddedView);
}

/// **VALUE**: Verifies broken JSON is reported as a parse error with the file path.
#[test]
fn given_malformed_json_when_loading_then_returns_parse_error() {
    // GIVEN
    let dir = TempDir::new().expect("temp dir");
    write(dir.path().join("viewer.json"), "{ not json").expect("write config");

    // WHEN
    let result = ViewerConfig::load(dir.path());

    // THEN
    match result {
        Err(ConfigError::ParseError { path, .. }) => {
            assert_eq!(path, dir.path().join("viewer.json"));
        }
        other => panic!("Expected ParseError, got {other:?}"),
    }
}

fn assert_rejected(name: &str, mutate: impl FnOnce(&mut ViewerConfig)) {
    let mut config = ViewerConfig::default();
    mutate(&mut config);

    assert!(
        matches!(config.validate(), Err(ConfigError::ValidationError { .. })),
        "{name} should fail validation"
    );
}

/// **VALUE**: Verifies each validation rule rejects its bad value.
///
/// **WHY THIS MATTERS**: A stem with a separator would let the artifact land outside the
/// served directory; a zero window would make every start fail with a confusing error.
///
/// **BUG THIS CATCHES**: Would catch a dropped validation rule.
#[test]
fn given_invalid_values_when_validating_then_returns_validation_error() {
    assert_rejected("version", |c| c.version = 99);
    assert_rejected("base_port", |c| c.server.base_port = 0);
    assert_rejected("port_window", |c| c.server.port_window = 0);
    assert_rejected("empty file_stem", |c| c.export.file_stem.clear());
    assert_rejected("file_stem separator", |c| c.export.file_stem = "../model".into());
    assert_rejected("extension dot", |c| c.export.extension = ".3dm".into());
    assert_rejected("probe_url", |c| c.connectivity.probe_url = "ftp://x".into());
    assert_rejected("timeout_secs", |c| c.connectivity.timeout_secs = 0);

    assert!(ViewerConfig::default().validate().is_ok());
}

/// **VALUE**: Verifies an invalid config is never written to disk.
#[test]
fn given_invalid_config_when_saving_then_nothing_written() {
    // GIVEN
    let dir = TempDir::new().expect("temp dir");
    let mut config = ViewerConfig::default();
    config.server.port_window = 0;

    // WHEN
    let result = config.save(dir.path());

    // THEN
    assert!(result.is_err());
    assert!(!dir.path().join("viewer.json").exists());
}
