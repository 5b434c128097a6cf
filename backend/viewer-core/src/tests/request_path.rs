use crate::server::{has_force_flag, request_file_name};

/// **VALUE**: Verifies ordinary artifact requests resolve to their file name.
#[test]
fn given_plain_file_path_when_extracting_name_then_returns_basename() {
    assert_eq!(
        request_file_name("/model8469.3dm").as_deref(),
        Some("model8469.3dm")
    );
    assert_eq!(
        request_file_name("/nested/dir/model8469.3dm").as_deref(),
        Some("model8469.3dm")
    );
    assert_eq!(
        request_file_name("/my%20model.3dm").as_deref(),
        Some("my model.3dm")
    );
}

/// **VALUE**: Verifies traversal attempts never produce a joinable name.
///
/// **WHY THIS MATTERS**: The name is joined onto the artifact directory. Anything that
/// decodes to a separator or a parent reference would let a local web page read arbitrary
/// files.
///
/// **BUG THIS CATCHES**: Would catch checking for `..` before percent-decoding, or only
/// rejecting forward slashes.
#[test]
fn given_traversal_attempt_when_extracting_name_then_returns_none() {
    for path in [
        "/",
        "/..",
        "/.",
        "/%2e%2e",
        "/%2E%2E",
        "/..%2Fsecret",
        "/..%2fsecret",
        "/..%5C..%5Cwin.ini",
        "/a%2Fb",
        "/file%00.3dm",
    ] {
        assert_eq!(request_file_name(path), None, "{path} should be rejected");
    }
}

/// **VALUE**: Verifies `force` is recognized by presence alone, in any case.
///
/// **BUG THIS CATCHES**: Would catch requiring `force=true` or matching `forced` by prefix.
#[test]
fn given_query_when_checking_force_then_detects_key_presence_only() {
    assert!(has_force_flag("force"));
    assert!(has_force_flag("force="));
    assert!(has_force_flag("force=0"));
    assert!(has_force_flag("FORCE"));
    assert!(has_force_flag("t=1&force"));

    assert!(!has_force_flag(""));
    assert!(!has_force_flag("forced"));
    assert!(!has_force_flag("mode=force"));
}
