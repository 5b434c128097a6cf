//! Artifact export.
//!
//! The host supplies an [`ExportBridge`] that serializes its document to a path. The
//! [`ArtifactExporter`] decides where that path is: it points the bridge at a temporary file
//! in the artifact directory and renames it over `model<port>.<ext>` once the bridge
//! succeeds, so the file server never hands out a half-written snapshot.

use crate::error::export::ExportError;

use common::ErrorLocation;

use std::env::current_exe;
use std::fs::{copy, create_dir_all};
use std::panic::{AssertUnwindSafe, Location, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use tempfile::Builder as TempFileBuilder;

pub const DEFAULT_FILE_STEM: &str = "model";
pub const DEFAULT_EXTENSION: &str = "3dm";
pub const RESOURCES_DIR_NAME: &str = "resources";

/// Host-side serializer for the document snapshot.
///
/// Implementations must overwrite `target` if it exists. Parent directories are created by
/// the caller.
pub trait ExportBridge: Send + Sync {
    fn export(&self, target: &Path) -> Result<(), ExportError>;
}

impl<F> ExportBridge for F
where
    F: Fn(&Path) -> Result<(), ExportError> + Send + Sync,
{
    fn export(&self, target: &Path) -> Result<(), ExportError> {
        self(target)
    }
}

/// Exports by copying an existing document file.
#[derive(Debug, Clone)]
pub struct FileCopyExporter {
    source: PathBuf,
}

impl FileCopyExporter {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl ExportBridge for FileCopyExporter {
    #[track_caller]
    fn export(&self, target: &Path) -> Result<(), ExportError> {
        copy(&self.source, target)
            .map(|bytes| debug!("Copied {bytes} bytes from {}", self.source.display()))
            .map_err(|e| ExportError::Bridge {
                message: format!(
                    "Failed to copy {} to {}: {e}",
                    self.source.display(),
                    target.display()
                ),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// Naming scheme for exported artifacts: `<base_dir>/<file_stem><port>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    base_dir: PathBuf,
    file_stem: String,
    extension: String,
}

impl ArtifactLayout {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        file_stem: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            file_stem: file_stem.into(),
            extension: extension.into(),
        }
    }

    /// Default stem and extension under `base_dir`.
    pub fn in_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self::new(base_dir, DEFAULT_FILE_STEM, DEFAULT_EXTENSION)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn artifact_file_name(&self, port: u16) -> String {
        format!("{}{port}.{}", self.file_stem, self.extension)
    }

    pub fn artifact_path(&self, port: u16) -> PathBuf {
        self.base_dir.join(self.artifact_file_name(port))
    }
}

/// `resources/` next to the running executable.
///
/// Falls back to the working directory when the executable path is unknown.
pub fn default_base_dir() -> PathBuf {
    match current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join(RESOURCES_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(RESOURCES_DIR_NAME)),
        Err(e) => {
            warn!("Failed to resolve executable path, using ./{RESOURCES_DIR_NAME}: {e}");
            PathBuf::from(RESOURCES_DIR_NAME)
        }
    }
}

/// Drives an [`ExportBridge`] into the artifact layout.
#[derive(Clone)]
pub struct ArtifactExporter {
    layout: ArtifactLayout,
    bridge: Arc<dyn ExportBridge>,
}

impl ArtifactExporter {
    pub fn new(layout: ArtifactLayout, bridge: Arc<dyn ExportBridge>) -> Self {
        Self { layout, bridge }
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Export the artifact for `port`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// - [`ExportError::Directory`] if the base directory or temp file cannot be created
    /// - [`ExportError::Bridge`] if the bridge fails or panics
    /// - [`ExportError::Persist`] if the finished file cannot be moved into place
    #[track_caller]
    pub fn export(&self, port: u16) -> Result<PathBuf, ExportError> {
        let base_dir = self.layout.base_dir();
        let final_path = self.layout.artifact_path(port);

        create_dir_all(base_dir).map_err(|e| ExportError::Directory {
            path: base_dir.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        let prefix = format!(".{}{port}-", self.layout.file_stem);
        let suffix = format!(".{}", self.layout.extension);
        let staging = TempFileBuilder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(base_dir)
            .map_err(|e| ExportError::Directory {
                path: base_dir.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
                source: e,
            })?;

        debug!("Exporting snapshot to staging file {}", staging.path().display());

        let bridge = Arc::clone(&self.bridge);
        let staging_path = staging.path().to_path_buf();
        match catch_unwind(AssertUnwindSafe(|| bridge.export(&staging_path))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(ExportError::Bridge {
                    message: String::from("Export bridge panicked"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        staging
            .persist(&final_path)
            .map_err(|e| ExportError::Persist {
                path: final_path.clone(),
                location: ErrorLocation::from(Location::caller()),
                source: e.error,
            })?;

        info!("Model exported to {}", final_path.display());
        Ok(final_path)
    }
}
