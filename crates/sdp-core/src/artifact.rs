use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{DeployError, Result};

/// One augmented stack file on disk.
///
/// Created owner-only; removed when dropped.
#[derive(Debug)]
pub struct TemporaryArtifact {
    file: NamedTempFile,
}

impl TemporaryArtifact {
    /// Write `contents` to a fresh file in `dir` (system temp dir if `None`).
    pub fn create(contents: &str, dir: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("docker-sdp-").suffix(".yml");
        let target = dir.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
        let mut file = builder
            .tempfile_in(&target)
            .map_err(|e| DeployError::io(&target, e))?;
        file.write_all(contents.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| DeployError::io(file.path(), e))?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Augmented files of one run, keyed by the stack file argument they replace.
///
/// Every artifact is removed when the set is dropped, whichever way the run
/// ends. Removal errors are ignored.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    entries: Vec<(String, TemporaryArtifact)>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stack_file: impl Into<String>, artifact: TemporaryArtifact) {
        self.entries.push((stack_file.into(), artifact));
    }

    /// Path of the artifact standing in for `stack_file`.
    pub fn path_for(&self, stack_file: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(original, _)| original == stack_file)
            .map(|(_, artifact)| artifact.path())
    }

    pub fn contains(&self, stack_file: &str) -> bool {
        self.path_for(stack_file).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for ArtifactSet {
    fn drop(&mut self) {
        if self.is_empty() {
            return;
        }
        info!(count = self.len(), "cleaning up augmented stack files");
        for (_, artifact) in self.entries.drain(..) {
            let _ = artifact.file.close();
        }
        info!("cleanup done");
    }
}
