use crate::activation::{ActivationRequest, ActivationTarget, LaunchMode};

/// **VALUE**: Verifies each target maps to its web client.
///
/// **WHY THIS MATTERS**: Viewer and Design intentionally share a URL; the rest must not.
#[test]
fn given_each_target_when_resolving_url_then_matches_web_client() {
    assert_eq!(
        ActivationTarget::Viewer.target_url(),
        "https://ijewel.design/rhinoceros"
    );
    assert_eq!(
        ActivationTarget::Design.target_url(),
        "https://ijewel.design/rhinoceros"
    );
    assert_eq!(
        ActivationTarget::Playground.target_url(),
        "https://playground.ijewel3d.com/v2/?rhino"
    );
    assert_eq!(
        ActivationTarget::Platform.target_url(),
        "https://ijewel3d.com/drive/playground?rhino"
    );
}

/// **VALUE**: Verifies enterprise drives are substituted and a blank name falls back.
///
/// **BUG THIS CATCHES**: Would catch `https://ijewel3d.com//playground` for an empty drive,
/// or an unescaped drive name breaking the path.
#[test]
fn given_enterprise_drive_when_resolving_url_then_uses_drive_or_default() {
    let named = ActivationTarget::Enterprise {
        drive: Some(String::from("acme")),
    };
    assert_eq!(named.target_url(), "https://ijewel3d.com/acme/playground?rhino");

    for drive in [None, Some(String::new()), Some(String::from("   "))] {
        let target = ActivationTarget::Enterprise { drive };
        assert_eq!(
            target.target_url(),
            "https://ijewel3d.com/drive/playground?rhino"
        );
    }

    let spaced = ActivationTarget::Enterprise {
        drive: Some(String::from("my drive")),
    };
    assert_eq!(
        spaced.target_url(),
        "https://ijewel3d.com/my%20drive/playground?rhino"
    );
}

/// **VALUE**: Verifies the platform default launch mode.
///
/// **WHY THIS MATTERS**: macOS has no reliable embedded web view, so it prefers the
/// browser; elsewhere the embedded view is the primary surface.
#[test]
fn given_current_platform_when_defaulting_launch_mode_then_matches_platform() {
    let expected = if cfg!(target_os = "macos") {
        LaunchMode::ExternalBrowser
    } else {
        LaunchMode::EmbeddedView
    };

    assert_eq!(LaunchMode::default(), expected);
    assert_eq!(
        ActivationRequest::new(ActivationTarget::Viewer).launch_mode,
        expected
    );
}

/// **VALUE**: Verifies launch modes use the snake_case names written in `viewer.json`.
#[test]
fn given_launch_mode_when_serialized_then_uses_snake_case() {
    assert_eq!(
        serde_json::to_string(&LaunchMode::ExternalBrowser).expect("serialize"),
        r#""external_browser""#
    );
    assert_eq!(
        serde_json::from_str::<LaunchMode>(r#""embedded_view""#).expect("deserialize"),
        LaunchMode::EmbeddedView
    );
}
