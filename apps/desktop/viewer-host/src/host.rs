//! Console stand-in for the host application's UI.

use viewer_core::activation::{MessageSeverity, ViewerHost};

use std::sync::{Mutex, PoisonError};

use log::{error, info, warn};

/// Shows dialogs as log lines and records the URL an embedded view would display.
#[derive(Debug, Default)]
pub struct ConsoleHost {
    embedded_url: Mutex<Option<String>>,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL of the last embedded view opened, if any.
    pub fn embedded_url(&self) -> Option<String> {
        self.embedded_url
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ViewerHost for ConsoleHost {
    fn show_message(&self, severity: MessageSeverity, title: &str, body: &str) {
        match severity {
            MessageSeverity::Info => info!("{title}: {body}"),
            MessageSeverity::Warning => warn!("{title}: {body}"),
            MessageSeverity::Error => error!("{title}: {body}"),
        }
    }

    fn open_embedded_view(&self, url: &str) {
        info!("No embedded view in console mode, open {url} manually");
        *self
            .embedded_url
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(url.to_string());
    }
}
