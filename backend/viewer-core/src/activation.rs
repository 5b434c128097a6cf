//! Viewer activation: connectivity check, server start, initial export, URL hand-off.

use crate::connectivity::ConnectivityChecker;
use crate::error::activation::ActivationError;
use crate::launcher::{self, Platform, with_port_query};
use crate::server::FileServer;

use common::ErrorLocation;

use std::panic::Location;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

const DESIGN_URL: &str = "https://ijewel.design/rhinoceros";
const PLAYGROUND_URL: &str = "https://playground.ijewel3d.com/v2/?rhino";
const PLATFORM_URL: &str = "https://ijewel3d.com/drive/playground?rhino";
const ENTERPRISE_URL_PREFIX: &str = "https://ijewel3d.com/";
const ENTERPRISE_URL_SUFFIX: &str = "/playground?rhino";
const DEFAULT_DRIVE: &str = "drive";

const NO_INTERNET_TITLE: &str = "No Internet Connection";
const NO_INTERNET_BODY: &str = "An internet connection is required to open the viewer. \
     Please check your internet connection and try again.";
const SERVER_FAILED_TITLE: &str = "Viewer Server Error";
const BROWSER_FAILED_TITLE: &str = "Error Launching Browser";

/// Where the viewer URL is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    /// A view owned by the host application.
    EmbeddedView,
    /// The system browser, falling back to the embedded view.
    ExternalBrowser,
}

impl Default for LaunchMode {
    /// External browser on macOS, embedded view elsewhere.
    fn default() -> Self {
        match Platform::current() {
            Platform::MacOs => LaunchMode::ExternalBrowser,
            Platform::Windows | Platform::Linux => LaunchMode::EmbeddedView,
        }
    }
}

/// Which web client to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationTarget {
    Viewer,
    Design,
    Playground,
    Platform,
    /// A named enterprise drive; blank or missing uses the default drive.
    Enterprise { drive: Option<String> },
}

impl ActivationTarget {
    pub fn target_url(&self) -> String {
        match self {
            ActivationTarget::Viewer | ActivationTarget::Design => DESIGN_URL.to_string(),
            ActivationTarget::Playground => PLAYGROUND_URL.to_string(),
            ActivationTarget::Platform => PLATFORM_URL.to_string(),
            ActivationTarget::Enterprise { drive } => {
                let drive = drive
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .unwrap_or(DEFAULT_DRIVE);
                format!(
                    "{ENTERPRISE_URL_PREFIX}{}{ENTERPRISE_URL_SUFFIX}",
                    urlencoding::encode(drive)
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRequest {
    pub target: ActivationTarget,
    pub launch_mode: LaunchMode,
}

impl ActivationRequest {
    /// A request using the platform's default launch mode.
    pub fn new(target: ActivationTarget) -> Self {
        Self {
            target,
            launch_mode: LaunchMode::default(),
        }
    }

    pub fn with_launch_mode(mut self, launch_mode: LaunchMode) -> Self {
        self.launch_mode = launch_mode;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Warning,
    Error,
}

/// UI capabilities the host application lends to activation.
pub trait ViewerHost: Send + Sync {
    fn show_message(&self, severity: MessageSeverity, title: &str, body: &str);

    /// Show `url` in a host-owned view. Closing that view should stop the server.
    fn open_embedded_view(&self, url: &str);

    /// Hand `url` to an external browser. Returns `false` when nothing could be opened.
    fn open_in_browser(&self, url: &str) -> bool {
        match launcher::open_url(url) {
            Ok(_) => true,
            Err(e) => {
                warn!("{e}");
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenedView {
    Browser,
    EmbeddedView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationOutcome {
    pub port: u16,
    pub url: String,
    pub view: OpenedView,
}

/// Run one activation.
///
/// # Errors
///
/// - [`ActivationError::Connectivity`] - offline; nothing was started
/// - [`ActivationError::Server`] - the server could not start
/// - [`ActivationError::Launch`] - the target URL could not take the port query
///
/// Connectivity and server failures are reported through [`ViewerHost::show_message`] before returning. A failed
/// initial export is only logged; the first poll retries it.
pub async fn activate(
    server: &mut FileServer,
    host: &dyn ViewerHost,
    connectivity: &impl ConnectivityChecker,
    request: &ActivationRequest,
) -> Result<ActivationOutcome, ActivationError> {
    info!("Checking internet connectivity...");
    if !connectivity.is_online().await {
        error!("No internet connection detected");
        host.show_message(MessageSeverity::Warning, NO_INTERNET_TITLE, NO_INTERNET_BODY);
        return Err(ActivationError::Connectivity {
            message: String::from("No internet connection detected"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let port = match server.start() {
        Ok(port) => port,
        Err(e) => {
            host.show_message(MessageSeverity::Error, SERVER_FAILED_TITLE, &e.to_string());
            return Err(e.into());
        }
    };

    match server.export_now() {
        Ok(path) => info!("Initial export written to {}", path.display()),
        Err(e) => warn!("Initial export failed: {e}"),
    }

    let url = with_port_query(&request.target.target_url(), port)?;

    let view = match request.launch_mode {
        LaunchMode::EmbeddedView => {
            host.open_embedded_view(&url);
            OpenedView::EmbeddedView
        }
        LaunchMode::ExternalBrowser => {
            if host.open_in_browser(&url) {
                OpenedView::Browser
            } else {
                let body = format!(
                    "None of the supported browsers appear to be installed or accessible.\n\n\
                     Please install {} to use the viewer.",
                    Platform::current().expected_browsers()
                );
                host.show_message(MessageSeverity::Error, BROWSER_FAILED_TITLE, &body);
                host.open_embedded_view(&url);
                OpenedView::EmbeddedView
            }
        }
    };

    info!("Viewer activated on port {port}: {url} ({view:?})");
    Ok(ActivationOutcome { port, url, view })
}
