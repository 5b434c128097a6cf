//! Command-line arguments for the host harness.

use viewer_core::activation::{ActivationTarget, LaunchMode};

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

/// Serve a document snapshot to the web viewer and re-export it whenever the file changes.
#[derive(Parser, Debug, Clone)]
#[command(name = "viewer-host")]
#[command(version)]
#[command(group(ArgGroup::new("launch").args(["embedded", "browser"])))]
pub struct Args {
    /// Document file to serve; it is watched and re-exported on every change
    #[arg(long, value_name = "FILE")]
    pub source: PathBuf,

    /// Web client to open
    #[arg(long, value_enum, default_value_t = TargetArg::Viewer)]
    pub target: TargetArg,

    /// Drive name for the enterprise target
    #[arg(long, value_name = "NAME")]
    pub drive: Option<String>,

    /// Directory holding viewer.json (defaults to the platform config directory)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory for viewer-host.log (defaults to the platform data directory)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Open the viewer in the host's embedded view
    #[arg(long)]
    pub embedded: bool,

    /// Open the viewer in an external browser
    #[arg(long)]
    pub browser: bool,

    /// Skip the internet connectivity probe
    #[arg(long)]
    pub skip_connectivity: bool,

    /// Log at trace level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetArg {
    Viewer,
    Design,
    Playground,
    Platform,
    Enterprise,
}

impl Args {
    pub fn activation_target(&self) -> ActivationTarget {
        match self.target {
            TargetArg::Viewer => ActivationTarget::Viewer,
            TargetArg::Design => ActivationTarget::Design,
            TargetArg::Playground => ActivationTarget::Playground,
            TargetArg::Platform => ActivationTarget::Platform,
            TargetArg::Enterprise => ActivationTarget::Enterprise {
                drive: self.drive.clone(),
            },
        }
    }

    /// Explicit `--embedded` / `--browser`, if either was given.
    pub fn launch_mode(&self) -> Option<LaunchMode> {
        if self.embedded {
            Some(LaunchMode::EmbeddedView)
        } else if self.browser {
            Some(LaunchMode::ExternalBrowser)
        } else {
            None
        }
    }
}
