use crate::ErrorLocation;

use std::panic::Location;

#[track_caller]
fn raise_here() -> ErrorLocation {
    ErrorLocation::from(Location::caller())
}

/// **VALUE**: Verifies that a `#[track_caller]` helper records the line of its caller.
///
/// **WHY THIS MATTERS**: Every error constructor in the workspace goes through a
/// `#[track_caller]` function. If the caller's line were lost, every error would point
/// at the constructor instead of the failing call.
///
/// **BUG THIS CATCHES**: Would catch if `ErrorLocation::from` stops being `const`-safe
/// with `Location::caller()` or if file/line capture regresses.
#[test]
fn given_track_caller_helper_when_invoked_then_records_call_site() {
    // GIVEN/WHEN: Two consecutive calls from this test
    let first = raise_here();
    let second = raise_here();

    // THEN: Both point at this file on consecutive lines
    assert!(first.file.ends_with("error_location.rs"));
    assert_eq!(first.file, second.file);
    assert_eq!(first.line + 1, second.line);
    assert!(first.column > 0);
}

/// **VALUE**: Pins the bracketed display format used in every error message.
///
/// **WHY THIS MATTERS**: Log scraping and the error-format tests in other crates rely on
/// the `[file:line:column]` suffix.
///
/// **BUG THIS CATCHES**: Would catch a Display change that drops the column or brackets.
#[test]
fn given_location_when_displayed_then_uses_file_line_column_brackets() {
    // GIVEN: A fixed location
    let location = ErrorLocation {
        file: "src/server/mod.rs",
        line: 42,
        column: 7,
    };

    // WHEN: Formatting
    let formatted = location.to_string();

    // THEN: Format is exact
    assert_eq!(formatted, "[src/server/mod.rs:42:7]");
}

/// **VALUE**: Verifies that locations serialize as a plain JSON object.
///
/// **WHY THIS MATTERS**: The host application serializes its errors (including
/// locations) when reporting them to a front-end.
///
/// **BUG THIS CATCHES**: Would catch removal of `Serialize` or a field rename.
#[test]
fn given_location_when_serialized_then_contains_all_fields() {
    // GIVEN: A location
    let location = ErrorLocation {
        file: "lib.rs",
        line: 3,
        column: 9,
    };

    // WHEN: Serializing
    let json = serde_json::to_value(location).expect("location should serialize");

    // THEN: All three fields are present
    assert_eq!(json["file"], "lib.rs");
    assert_eq!(json["line"], 3);
    assert_eq!(json["column"], 9);
}
