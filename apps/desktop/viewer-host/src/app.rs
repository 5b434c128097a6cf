//! Host harness wiring: config, server, watcher, activation, shutdown.

use crate::cli::Args;
use crate::error::HostError;
use crate::host::ConsoleHost;
use crate::logger::{self, LogSettings, default_log_dir};
use crate::watcher::watch_document;

use viewer_core::activation::{ActivationOutcome, ActivationRequest, activate};
use viewer_core::change_tracker::ChangeTracker;
use viewer_core::config::{ViewerConfig, default_config_dir};
use viewer_core::connectivity::{AlwaysOnline, HttpConnectivityChecker};
use viewer_core::error::CoreError;
use viewer_core::export::FileCopyExporter;
use viewer_core::identity::StaticIdentity;
use viewer_core::server::FileServer;

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

use log::{LevelFilter, info, warn};
use uuid::Uuid;

/// Run the harness until Ctrl-C.
pub async fn run(args: Args) -> Result<(), HostError> {
    let mut log_settings = LogSettings::new(args.log_dir.clone().unwrap_or_else(default_log_dir));
    if args.verbose {
        log_settings = log_settings.with_level(LevelFilter::Trace);
    }
    logger::initialize(&log_settings)?;

    info!("Viewer host starting");

    let config_dir = match &args.config_dir {
        Some(dir) => dir.clone(),
        None => default_config_dir()?,
    };
    let mut config = ViewerConfig::load(&config_dir)?;
    let identity = ensure_identity(&mut config, &config_dir);

    let tracker = ChangeTracker::new();
    let mut server = build_server(&config, &args.source, tracker.clone(), identity)?;
    let _watcher = watch_document(&args.source, tracker.on_host_change())?;

    let request = ActivationRequest {
        target: args.activation_target(),
        launch_mode: args.launch_mode().unwrap_or_else(|| config.launch_mode()),
    };
    let host = ConsoleHost::new();

    let outcome = if args.skip_connectivity || !config.connectivity.enabled {
        activate(&mut server, &host, &AlwaysOnline, &request).await?
    } else {
        let checker = HttpConnectivityChecker::new(
            config.connectivity.probe_url.clone(),
            config.probe_timeout(),
        );
        activate(&mut server, &host, &checker, &request).await?
    };
    report(&outcome, &server);

    wait_for_shutdown().await?;

    info!("Shutting down");
    server.stop();
    Ok(())
}

/// Server for `source`, laid out and windowed per `config`.
#[track_caller]
pub fn build_server(
    config: &ViewerConfig,
    source: &Path,
    tracker: ChangeTracker,
    identity: Uuid,
) -> Result<FileServer, HostError> {
    FileServer::builder()
        .with_tracker(tracker)
        .with_bridge(Arc::new(FileCopyExporter::new(source)))
        .with_layout(config.artifact_layout())
        .with_identity(Arc::new(StaticIdentity(Some(identity))))
        .with_port_window(config.port_window())
        .build()
        .map_err(|e| HostError::from(CoreError::from(e)))
}

/// The configured identity, generating and persisting one on first run.
///
/// A failed save only costs stability across runs, so it is logged and ignored.
pub fn ensure_identity(config: &mut ViewerConfig, config_dir: &Path) -> Uuid {
    if let Some(identity) = config.identity.filter(|id| !id.is_nil()) {
        return identity;
    }

    let identity = Uuid::new_v4();
    config.identity = Some(identity);
    if let Err(e) = config.save(config_dir) {
        warn!("Failed to persist generated identity: {e}");
    }
    identity
}

fn report(outcome: &ActivationOutcome, server: &FileServer) {
    info!(
        "Viewer ready on port {} ({:?}): {}",
        outcome.port, outcome.view, outcome.url
    );
    if let Some(base_url) = server.base_url() {
        info!(
            "Serving {} from {base_url}",
            server.layout().artifact_file_name(outcome.port)
        );
    }
    info!("Press Ctrl-C to stop");
}

async fn wait_for_shutdown() -> Result<(), HostError> {
    tokio::signal::ctrl_c().await.map_err(|e| HostError::Host {
        message: format!("Failed to listen for Ctrl-C: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}
