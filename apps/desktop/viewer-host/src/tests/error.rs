// Unit tests for error module
// Tests serialization and conversions from core errors

use crate::error::HostError;

use viewer_core::error::{ConfigError, CoreError, ServerError};

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Tests that errors serialize with a `type` tag and their data.
///
/// **WHY THIS MATTERS**: Errors are emitted as structured JSON for tooling that watches the
/// host; an untagged or non-serializable error would break that output.
///
/// **BUG THIS CATCHES**: Would catch removing `#[derive(Serialize)]`, changing the tag
/// layout, or adding a non-serializable field.
#[test]
fn given_host_error_when_serialized_then_tagged_with_variant() {
    // GIVEN: A HostError
    let err = HostError::Watch {
        message: String::from("Cannot watch model.3dm"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Serializing to JSON
    let json = serde_json::to_value(&err).expect("serializable");

    // THEN: Tagged with the variant and carrying message and location
    assert_eq!(json["type"], "Watch");
    assert_eq!(json["data"]["message"], "Cannot watch model.3dm");
    assert!(json["data"]["location"]["line"].is_number());
}

/// **VALUE**: Tests that core errors keep their text when converted.
///
/// **BUG THIS CATCHES**: Would catch a conversion that drops the original message, leaving
/// only "Core Error" in the log.
#[test]
fn given_core_error_when_converted_then_message_preserved() {
    // GIVEN
    let core = CoreError::from(ServerError::PortExhausted {
        message: String::from("No free ports available in 8469..8499"),
        location: ErrorLocation::from(Location::caller()),
    });

    // WHEN
    let err = HostError::from(core);

    // THEN
    match err {
        HostError::Core { message, .. } => {
            assert!(message.contains("No free ports available in 8469..8499"));
        }
        other => panic!("Expected Core variant, got {other:?}"),
    }
}

/// **VALUE**: Tests that config errors map to the `Config` variant.
#[test]
fn given_config_error_when_converted_then_config_variant() {
    let err = HostError::from(ConfigError::ValidationError {
        reason: String::from("port_window must be non-zero"),
        location: ErrorLocation::from(Location::caller()),
    });

    assert!(matches!(err, HostError::Config { .. }));
    assert!(err.to_string().starts_with("Config Error: "));
}
