//! Best-effort hand-off of the viewer URL to an external browser.
//!
//! Each platform has an ordered list of [`LaunchAttempt`]s. They are tried in order and the
//! first one that spawns wins. The launch never waits on the child: it is reaped on a
//! detached thread so a short-lived opener does not linger as a zombie. When every attempt
//! fails the caller falls back to an embedded view.

use crate::error::launch::LaunchError;

use common::ErrorLocation;

use std::panic::Location;
use std::process::{Child, Command, Stdio};
use std::thread::{Builder as ThreadBuilder, JoinHandle};

use log::{debug, info, warn};
use url::Url;

pub const PORT_QUERY_KEY: &str = "p";

const MACOS_OPEN: &str = "open";
const MACOS_CHROME_PATH: &str = "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome";
const MACOS_FIREFOX_PATH: &str = "/Applications/Firefox.app/Contents/MacOS/firefox";
const MACOS_OPERA_PATH: &str = "/Applications/Opera.app/Contents/MacOS/Opera";
const WINDOWS_SHELL: &str = "cmd";
const XDG_OPEN: &str = "xdg-open";
const REAPER_THREAD_NAME: &str = "browser-launch-reaper";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Browsers named in the failure dialog.
    pub const fn expected_browsers(self) -> &'static str {
        match self {
            Platform::MacOs => "Google Chrome, Firefox, or Opera",
            Platform::Windows | Platform::Linux => {
                "Google Chrome, Firefox, Opera, or Microsoft Edge"
            }
        }
    }
}

/// One program invocation to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchAttempt {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchAttempt {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

/// Append `p=<port>` to `link`, keeping any existing query.
#[track_caller]
pub fn with_port_query(link: &str, port: u16) -> Result<String, LaunchError> {
    if link.trim().is_empty() {
        return Err(LaunchError::InvalidUrl {
            message: String::from("URL cannot be empty"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let mut url = Url::parse(link).map_err(|e| LaunchError::InvalidUrl {
        message: format!("Invalid URL '{link}': {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    url.query_pairs_mut()
        .append_pair(PORT_QUERY_KEY, &port.to_string());

    Ok(url.into())
}

/// Ordered launch attempts for `platform`.
pub fn launch_attempts(platform: Platform, url: &str) -> Vec<LaunchAttempt> {
    match platform {
        Platform::MacOs => vec![
            LaunchAttempt::new(
                MACOS_OPEN,
                ["-na", "Google Chrome", "--args", "--new-window", url],
            ),
            LaunchAttempt::new(MACOS_CHROME_PATH, [url]),
            LaunchAttempt::new(MACOS_OPEN, ["-a", "Firefox", url]),
            LaunchAttempt::new(MACOS_FIREFOX_PATH, [url]),
            LaunchAttempt::new(MACOS_OPEN, ["-a", "Opera", url]),
            LaunchAttempt::new(MACOS_OPERA_PATH, [url]),
        ],
        // The empty title keeps `start` from treating a quoted URL as the window title.
        Platform::Windows => vec![LaunchAttempt::new(WINDOWS_SHELL, ["/C", "start", "", url])],
        Platform::Linux => vec![LaunchAttempt::new(XDG_OPEN, [url])],
    }
}

/// Spawn attempts in order until one starts.
///
/// Returns the index of the attempt that spawned.
#[track_caller]
pub fn run_attempts(attempts: &[LaunchAttempt]) -> Result<usize, LaunchError> {
    for (index, attempt) in attempts.iter().enumerate() {
        debug!("Launch attempt {index}: {} {:?}", attempt.program, attempt.args);

        match attempt.command().spawn() {
            Ok(child) => {
                info!(
                    "Opened browser via {} (PID: {})",
                    attempt.program,
                    child.id()
                );
                reap_in_background(child);
                return Ok(index);
            }
            Err(e) => warn!("Open browser attempt {index} failed: {e}"),
        }
    }

    Err(LaunchError::AllAttemptsFailed {
        attempts: attempts.len(),
        message: format!("All {} browser launch attempts failed", attempts.len()),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Wait for `child` on a detached thread. Returns `None` if the thread could not be spawned,
/// in which case the child is left to the OS.
pub(crate) fn reap_in_background(mut child: Child) -> Option<JoinHandle<()>> {
    let pid = child.id();
    let spawned = ThreadBuilder::new()
        .name(String::from(REAPER_THREAD_NAME))
        .spawn(move || match child.wait() {
            Ok(status) => debug!("Browser launcher {pid} exited with {status}"),
            Err(e) => warn!("Failed to wait for browser launcher {pid}: {e}"),
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to spawn reaper for browser launcher {pid}: {e}");
            None
        }
    }
}

/// Open an already complete `url` using the current platform's attempts.
#[track_caller]
pub fn open_url(url: &str) -> Result<LaunchAttempt, LaunchError> {
    let mut attempts = launch_attempts(Platform::current(), url);
    let index = run_attempts(&attempts)?;
    Ok(attempts.swap_remove(index))
}

/// Open `link` with the port appended using the current platform's attempts.
#[track_caller]
pub fn try_launch(link: &str, port: u16) -> Result<LaunchAttempt, LaunchError> {
    let url = with_port_query(link, port)?;
    open_url(&url)
}

/// `true` if any attempt spawned.
pub fn launch(link: &str, port: u16) -> bool {
    match try_launch(link, port) {
        Ok(_) => true,
        Err(e) => {
            warn!("{e}");
            false
        }
    }
}
