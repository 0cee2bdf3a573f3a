use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::common::error::{ConversionError, ConversionResult};
use crate::common::job_id::{is_asset_file_name, JobId};

/// Local-disk storage for downloaded sources and produced outputs.
#[derive(Clone, Debug)]
pub struct StorageService {
    temp_dir: PathBuf,
    public_dir: PathBuf,
}

impl StorageService {
    pub fn new(temp_dir: impl Into<PathBuf>, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            public_dir: public_dir.into(),
        }
    }

    /// Creates both storage roots if they are missing.
    pub async fn ensure_dirs(&self) -> ConversionResult<()> {
        for dir in [&self.temp_dir, &self.public_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ConversionError::io(dir, e))?;
        }

        info!(
            "✅ Storage ready (temp: {}, public: {})",
            self.temp_dir.display(),
            self.public_dir.display()
        );
        Ok(())
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    pub fn temp_path(&self, id: &JobId) -> PathBuf {
        self.temp_dir.join(id.file_name())
    }

    pub fn public_path(&self, id: &JobId) -> PathBuf {
        self.public_dir.join(id.file_name())
    }

    /// Maps a requested file name to a path under the public root.
    ///
    /// Returns `None` for names the pipeline never produces.
    pub fn resolve_public(&self, file_name: &str) -> Option<PathBuf> {
        is_asset_file_name(file_name).then(|| self.public_dir.join(file_name))
    }

    /// Reserves the temporary download slot for `id`.
    pub fn temporary_asset(&self, id: &JobId) -> TemporaryAsset {
        TemporaryAsset::new(self.temp_path(id))
    }

    /// Reserves the public output slot for `id`.
    pub fn pending_output(&self, id: &JobId) -> PendingOutput {
        PendingOutput::new(self.public_path(id))
    }
}

/// Scoped ownership of a temporary download.
///
/// The file is removed by [`TemporaryAsset::release`] or, if the owner bails
/// out early (error, panic, cancelled future), when the guard is dropped.
#[derive(Debug)]
pub struct TemporaryAsset {
    path: PathBuf,
    released: bool,
}

impl TemporaryAsset {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn release(mut self) -> ConversionResult<()> {
        self.released = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ConversionError::io(&self.path, e)),
        }
    }
}

impl Drop for TemporaryAsset {
    fn drop(&mut self) {
        if !self.released {
            remove_now(&self.path);
        }
    }
}

/// A public output that only survives once the transcode has succeeded.
///
/// Until [`PendingOutput::commit`] is called, dropping the guard removes
/// whatever ffmpeg managed to write, so a failed or cancelled job never
/// leaves a servable file behind.
#[derive(Debug)]
pub struct PendingOutput {
    path: PathBuf,
    committed: bool,
}

impl PendingOutput {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Marks the output as a finished PublicAsset and hands back its path.
    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for PendingOutput {
    fn drop(&mut self) {
        if !self.committed {
            remove_now(&self.path);
        }
    }
}

// Drop cannot await; a single unlink is cheap enough to run inline on the
// runtime thread.
fn remove_now(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}
