use crate::host::ConsoleHost;

use viewer_core::activation::{MessageSeverity, ViewerHost};

/// **VALUE**: Verifies the console host remembers the URL it was asked to embed.
///
/// **WHY THIS MATTERS**: In console mode the embedded view is the user's only hint of which
/// URL to open.
#[test]
fn given_console_host_when_embedding_then_url_recorded() {
    // GIVEN
    let host = ConsoleHost::new();
    assert_eq!(host.embedded_url(), None);

    // WHEN
    host.show_message(MessageSeverity::Info, "Viewer", "starting");
    host.open_embedded_view("https://ijewel.design/rhinoceros?p=8469");

    // THEN
    assert_eq!(
        host.embedded_url().as_deref(),
        Some("https://ijewel.design/rhinoceros?p=8469")
    );
}
