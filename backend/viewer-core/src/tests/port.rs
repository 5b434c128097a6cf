use crate::port::{PortWindow, is_port_in_use};
use crate::{DEFAULT_BASE_PORT, DEFAULT_PORT_WINDOW, LOOPBACK_ADDRESS};

use std::net::TcpListener;

fn ephemeral_port() -> u16 {
    let listener = TcpListener::bind((LOOPBACK_ADDRESS, 0)).expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

/// **VALUE**: Verifies the default window matches the documented `8469` start and 30 ports.
///
/// **WHY THIS MATTERS**: Web clients and firewall rules are written against this range.
///
/// **BUG THIS CATCHES**: Would catch a changed default base or an off-by-one window size.
#[test]
fn given_default_window_when_listing_candidates_then_covers_8469_to_8498() {
    // GIVEN: The default window
    let window = PortWindow::default();

    // WHEN: Listing candidates
    let candidates: Vec<u16> = window.candidates().collect();

    // THEN: 30 ports in ascending order starting at 8469
    assert_eq!(window.base, DEFAULT_BASE_PORT);
    assert_eq!(candidates.len(), usize::from(DEFAULT_PORT_WINDOW));
    assert_eq!(candidates.first(), Some(&8469));
    assert_eq!(candidates.last(), Some(&8498));
}

/// **VALUE**: Verifies that a window near the top of the port range does not wrap.
///
/// **BUG THIS CATCHES**: Would catch `u16` overflow turning `65535 + 1` into port 0.
#[test]
fn given_window_at_end_of_range_when_listing_candidates_then_clamps_at_u16_max() {
    // GIVEN: A window that would run past 65535
    let window = PortWindow::new(65534, 5);

    // WHEN: Listing candidates
    let candidates: Vec<u16> = window.candidates().collect();

    // THEN: Only the ports that exist
    assert_eq!(candidates, vec![65534, 65535]);
}

/// **VALUE**: Verifies that a free window yields its first candidate.
///
/// **WHY THIS MATTERS**: The scan must start at the base so repeated activations land on
/// predictable ports.
///
/// **BUG THIS CATCHES**: Would catch a scan that skips the base port or starts in the middle.
#[test]
fn given_free_window_when_finding_port_then_returns_first_candidate() {
    // GIVEN: A window whose only candidate was just released
    let port = ephemeral_port();
    let window = PortWindow::new(port, 1);

    // WHEN: Finding a free port
    let found = window.find_free_port();

    // THEN: The first candidate is returned
    assert_eq!(found, Some(port));
}

/// **VALUE**: Verifies that a fully occupied window reports exhaustion.
///
/// **WHY THIS MATTERS**: Port exhaustion must be reported to the user, not turned into a
/// bind on a busy port.
///
/// **BUG THIS CATCHES**: Would catch a probe that treats a bind failure as "free".
#[test]
fn given_saturated_window_when_finding_port_then_returns_none() {
    // GIVEN: The only candidate is held by a listener
    let holder = TcpListener::bind((LOOPBACK_ADDRESS, 0)).expect("bind ephemeral port");
    let port = holder.local_addr().expect("local addr").port();
    let window = PortWindow::new(port, 1);

    // WHEN: Finding a free port
    let found = window.find_free_port();

    // THEN: Nothing is free
    assert!(is_port_in_use(port), "Held port should be reported in use");
    assert_eq!(found, None);
}

/// **VALUE**: Verifies that busy candidates are skipped rather than ending the scan.
///
/// **BUG THIS CATCHES**: Would catch a scan that gives up at the first busy port.
#[test]
fn given_busy_first_candidate_when_finding_port_then_skips_to_next_free() {
    // GIVEN: A held first candidate, followed by free ones
    let holder = TcpListener::bind((LOOPBACK_ADDRESS, 0)).expect("bind ephemeral port");
    let port = holder.local_addr().expect("local addr").port();
    let window = PortWindow::new(port, 8);

    // WHEN: Finding a free port
    let found = window.find_free_port().expect("some port in the window should be free");

    // THEN: A later candidate is returned
    assert!(found > port);
    assert!(u32::from(found) < u32::from(port) + 8);
}

/// **VALUE**: Verifies the empty window edge case.
///
/// **BUG THIS CATCHES**: Would catch a scan that still probes `base` when `count` is zero.
#[test]
fn given_empty_window_when_finding_port_then_returns_none() {
    // GIVEN: A zero-sized window
    let window = PortWindow::new(ephemeral_port(), 0);

    // WHEN / THEN: Nothing to return
    assert_eq!(window.candidates().count(), 0);
    assert_eq!(window.find_free_port(), None);
}
