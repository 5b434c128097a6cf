use viewer_core::error::{
    ActivationError, ConfigError, CoreError, ExportError, LaunchError, ServerError,
};

use common::ErrorLocation;

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;
use std::path::PathBuf;

/// **VALUE**: Verifies `ServerError::ListenerBind` includes kind, message, location, and
/// keeps the I/O error as its source.
///
/// **WHY THIS MATTERS**: A late bind failure is the probe/bind race; the log line has to say
/// which port and where it was raised for anyone to tell it apart from exhaustion.
///
/// **BUG THIS CATCHES**: Would catch a dropped `#[source]` or a Display without location.
#[test]
fn given_listener_bind_error_when_formatted_then_includes_location_and_source() {
    // GIVEN
    let err = ServerError::ListenerBind {
        port: 8469,
        message: String::from("Failed to bind 127.0.0.1:8469"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::AddrInUse, "address in use")),
    };

    // WHEN
    let text = err.to_string();

    // THEN
    assert!(text.starts_with("Listener Bind Error: Failed to bind 127.0.0.1:8469 ["));
    assert!(text.contains("error.rs"));
    assert_eq!(
        err.source().map(ToString::to_string).as_deref(),
        Some("address in use")
    );
}

/// **VALUE**: Verifies exhaustion errors carry location tracking.
#[test]
fn given_port_exhausted_error_when_formatted_then_includes_location() {
    let err = ServerError::PortExhausted {
        message: String::from("No free ports available in 8469..8499"),
        location: ErrorLocation::from(Location::caller()),
    };

    let text = err.to_string();

    assert!(text.contains("Port Exhausted Error"));
    assert!(text.contains("8469..8499"));
    assert!(text.contains("error.rs"));
}

/// **VALUE**: Verifies export errors name the path and chain the I/O error.
#[test]
fn given_persist_error_when_formatted_then_includes_path() {
    let err = ExportError::Persist {
        path: PathBuf::from("resources/model8469.3dm"),
        location: ErrorLocation::from(Location::caller()),
        source: IoError::new(ErrorKind::PermissionDenied, "denied"),
    };

    let text = err.to_string();

    assert!(text.contains("Export Persist Error"));
    assert!(text.contains("model8469.3dm"));
    assert!(err.source().is_some());
}

/// **VALUE**: Verifies launch failures report how many attempts were made.
#[test]
fn given_all_attempts_failed_when_formatted_then_includes_message() {
    let err = LaunchError::AllAttemptsFailed {
        attempts: 6,
        message: String::from("All 6 browser launch attempts failed"),
        location: ErrorLocation::from(Location::caller()),
    };

    assert!(err.to_string().contains("Launch Error: All 6 browser launch attempts failed"));
}

/// **VALUE**: Verifies config validation errors carry the reason.
#[test]
fn given_config_validation_error_when_formatted_then_includes_reason() {
    let err = ConfigError::ValidationError {
        reason: String::from("port_window must be non-zero"),
        location: ErrorLocation::from(Location::caller()),
    };

    assert!(err.to_string().contains("port_window must be non-zero"));
}

/// **VALUE**: Verifies wrapped errors display exactly like the error they wrap.
///
/// **BUG THIS CATCHES**: Would catch a wrapper that prefixes its own text and hides the
/// location of the original error.
#[test]
fn given_server_error_when_wrapped_then_display_is_transparent() {
    // GIVEN
    let inner = || ServerError::Worker {
        message: String::from("Failed to spawn server thread"),
        location: ErrorLocation::from(Location::caller()),
    };
    let expected = inner().to_string();

    // WHEN
    let activation: ActivationError = inner().into();
    let core: CoreError = activation.into();

    // THEN
    assert_eq!(core.to_string(), expected);
    assert!(matches!(
        core,
        CoreError::Activation(ActivationError::Server(ServerError::Worker { .. }))
    ));
}
