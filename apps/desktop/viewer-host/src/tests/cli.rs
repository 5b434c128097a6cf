use crate::cli::{Args, TargetArg};

use viewer_core::activation::{ActivationTarget, LaunchMode};

use std::path::PathBuf;

use clap::Parser;

/// **VALUE**: Verifies the minimal invocation picks the viewer target and defers launch mode
/// to config.
#[test]
fn given_only_source_when_parsing_then_defaults_apply() {
    // GIVEN / WHEN
    let args = Args::try_parse_from(["viewer-host", "--source", "model.3dm"]).expect("parse");

    // THEN
    assert_eq!(args.source, PathBuf::from("model.3dm"));
    assert_eq!(args.target, TargetArg::Viewer);
    assert_eq!(args.activation_target(), ActivationTarget::Viewer);
    assert_eq!(args.launch_mode(), None);
    assert!(!args.skip_connectivity);
}

/// **VALUE**: Verifies the enterprise target carries the drive name.
#[test]
fn given_enterprise_with_drive_when_parsing_then_target_has_drive() {
    let args = Args::try_parse_from([
        "viewer-host",
        "--source",
        "model.3dm",
        "--target",
        "enterprise",
        "--drive",
        "acme",
        "--browser",
        "--skip-connectivity",
    ])
    .expect("parse");

    assert_eq!(
        args.activation_target(),
        ActivationTarget::Enterprise {
            drive: Some(String::from("acme"))
        }
    );
    assert_eq!(args.launch_mode(), Some(LaunchMode::ExternalBrowser));
    assert!(args.skip_connectivity);
}

/// **VALUE**: Verifies `--embedded` and `--browser` cannot be combined.
///
/// **BUG THIS CATCHES**: Would catch one flag silently winning over the other.
#[test]
fn given_both_launch_flags_when_parsing_then_rejected() {
    let result = Args::try_parse_from([
        "viewer-host",
        "--source",
        "model.3dm",
        "--embedded",
        "--browser",
    ]);

    assert!(result.is_err());
}

/// **VALUE**: Verifies the source document is required.
#[test]
fn given_no_source_when_parsing_then_rejected() {
    assert!(Args::try_parse_from(["viewer-host"]).is_err());
}
