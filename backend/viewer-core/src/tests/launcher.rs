use crate::error::launch::LaunchError;
use crate::launcher::{
    LaunchAttempt, Platform, launch, launch_attempts, reap_in_background, run_attempts,
    with_port_query,
};

const MISSING_PROGRAM: &str = "/nonexistent/definitely-not-a-browser";

/// **VALUE**: Verifies the port is appended with `?` when the URL has no query.
///
/// **BUG THIS CATCHES**: Would catch a hand-built `&p=` producing `.../rhinoceros&p=8469`.
#[test]
fn given_url_without_query_when_adding_port_then_uses_question_mark() {
    // GIVEN / WHEN
    let url = with_port_query("https://ijewel.design/rhinoceros", 8469).expect("valid url");

    // THEN
    assert_eq!(url, "https://ijewel.design/rhinoceros?p=8469");
}

/// **VALUE**: Verifies existing query parameters are kept and the port is appended with `&`.
///
/// **WHY THIS MATTERS**: Several targets carry a bare `?rhino` flag the web client relies on.
///
/// **BUG THIS CATCHES**: Would catch the port replacing the existing query.
#[test]
fn given_url_with_query_when_adding_port_then_appends_with_ampersand() {
    // GIVEN / WHEN
    let url = with_port_query("https://playground.ijewel3d.com/v2/?rhino", 8470)
        .expect("valid url");

    // THEN
    assert_eq!(url, "https://playground.ijewel3d.com/v2/?rhino&p=8470");
}

/// **VALUE**: Verifies empty and malformed links are rejected with `InvalidUrl`.
///
/// **BUG THIS CATCHES**: Would catch handing garbage to the OS shell.
#[test]
fn given_invalid_link_when_adding_port_then_returns_invalid_url() {
    for link in ["", "   ", "not a url"] {
        let result = with_port_query(link, 8469);
        assert!(
            matches!(result, Err(LaunchError::InvalidUrl { .. })),
            "{link:?} should be rejected"
        );
    }
}

/// **VALUE**: Verifies the macOS chain tries Chrome, Firefox, then Opera, by name then by path.
///
/// **WHY THIS MATTERS**: The order decides which browser users get; the named `open -na`
/// form is needed for Chrome to get a fresh window.
///
/// **BUG THIS CATCHES**: Would catch a reordered or truncated attempt list.
#[test]
fn given_macos_when_building_attempts_then_lists_six_in_preference_order() {
    // GIVEN / WHEN
    let url = "https://ijewel.design/rhinoceros?p=8469";
    let attempts = launch_attempts(Platform::MacOs, url);

    // THEN
    assert_eq!(attempts.len(), 6);
    assert_eq!(
        attempts[0],
        LaunchAttempt::new(
            "open",
            ["-na", "Google Chrome", "--args", "--new-window", url]
        )
    );
    assert!(attempts[1].program.ends_with("Google Chrome"));
    assert_eq!(attempts[2], LaunchAttempt::new("open", ["-a", "Firefox", url]));
    assert!(attempts[3].program.ends_with("firefox"));
    assert_eq!(attempts[4], LaunchAttempt::new("open", ["-a", "Opera", url]));
    assert!(attempts[5].program.ends_with("Opera"));
    assert!(attempts.iter().all(|a| a.args.last().map(String::as_str) == Some(url)));
}

/// **VALUE**: Verifies the other platforms use a single shell-delegated attempt.
#[test]
fn given_windows_or_linux_when_building_attempts_then_single_default_handler() {
    let url = "https://ijewel.design/rhinoceros?p=8469";

    let windows = launch_attempts(Platform::Windows, url);
    assert_eq!(windows, vec![LaunchAttempt::new("cmd", ["/C", "start", "", url])]);

    let linux = launch_attempts(Platform::Linux, url);
    assert_eq!(linux, vec![LaunchAttempt::new("xdg-open", [url])]);
}

/// **VALUE**: Verifies every attempt is tried and the failure reports how many.
///
/// **WHY THIS MATTERS**: `false` from the launcher is what triggers the embedded fallback.
///
/// **BUG THIS CATCHES**: Would catch stopping after the first failure.
#[test]
fn given_only_missing_programs_when_running_attempts_then_all_attempts_failed() {
    // GIVEN
    let attempts = vec![
        LaunchAttempt::new(MISSING_PROGRAM, ["a"]),
        LaunchAttempt::new(format!("{MISSING_PROGRAM}-2"), ["b"]),
    ];

    // WHEN
    let result = run_attempts(&attempts);

    // THEN
    match result {
        Err(LaunchError::AllAttemptsFailed { attempts, .. }) => assert_eq!(attempts, 2),
        other => panic!("Expected AllAttemptsFailed, got {other:?}"),
    }
}

/// **VALUE**: Verifies the first attempt that spawns wins and later ones are not run.
///
/// **BUG THIS CATCHES**: Would catch opening several browsers at once.
#[cfg(unix)]
#[test]
fn given_second_attempt_spawns_when_running_attempts_then_returns_its_index() {
    // GIVEN: A missing program, then one that exists
    let attempts = vec![
        LaunchAttempt::new(MISSING_PROGRAM, Vec::<String>::new()),
        LaunchAttempt::new("true", Vec::<String>::new()),
        LaunchAttempt::new(MISSING_PROGRAM, Vec::<String>::new()),
    ];

    // WHEN / THEN
    assert_eq!(run_attempts(&attempts).expect("second attempt spawns"), 1);
}

/// **VALUE**: Verifies a spawned launcher is waited on once it exits.
///
/// **WHY THIS MATTERS**: `open` and `xdg-open` exit almost immediately. A child that is
/// never waited on stays in the process table as a zombie until the host quits, one per
/// activation.
///
/// **BUG THIS CATCHES**: Would catch dropping the `Child` without reaping it.
#[cfg(target_os = "linux")]
#[test]
fn given_exited_launcher_when_reaped_then_no_zombie_left() {
    // GIVEN: A short-lived child
    let child = LaunchAttempt::new("true", Vec::<String>::new())
        .command()
        .spawn()
        .expect("spawn true");
    let pid = child.id();

    // WHEN
    reap_in_background(child)
        .expect("reaper thread")
        .join()
        .expect("reaper finished");

    // THEN: The process entry is gone, not left as a zombie
    assert!(!std::path::Path::new(&format!("/proc/{pid}")).exists());
}

/// **VALUE**: Verifies the boolean wrapper turns a bad link into `false` without panicking.
#[test]
fn given_invalid_link_when_launching_then_returns_false() {
    assert!(!launch("", 8469));
}

/// **VALUE**: Verifies the dialog text names the browsers each platform actually tries.
#[test]
fn given_platform_when_listing_expected_browsers_then_edge_only_off_macos() {
    assert!(!Platform::MacOs.expected_browsers().contains("Edge"));
    assert!(Platform::Windows.expected_browsers().contains("Microsoft Edge"));
}
