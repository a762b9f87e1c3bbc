use std::process::ExitStatus;

use tracing::{debug, info};

use crate::args::{scan_stack_files, StackFileArg};
use crate::artifact::{ArtifactSet, TemporaryArtifact};
use crate::augment::StackAugmenter;
use crate::config::DeployConfig;
use crate::document;
use crate::error::{DeployError, Result};
use crate::forward;

/// A deploy invocation with every stack file already augmented.
///
/// Holds the artifacts; dropping it removes them.
#[derive(Debug)]
pub struct PreparedDeploy {
    /// Arguments to pass to docker, stack files replaced.
    pub args: Vec<String>,
    /// The stack-file references that were replaced.
    pub stack_files: Vec<StackFileArg>,
    artifacts: ArtifactSet,
}

impl PreparedDeploy {
    pub fn artifacts(&self) -> &ArtifactSet {
        &self.artifacts
    }
}

/// Runs `docker stack deploy` with rotated secrets and configs.
pub struct StackDeployer {
    config: DeployConfig,
}

impl StackDeployer {
    pub fn new(config: DeployConfig) -> Self {
        Self { config }
    }

    /// Augment one stack file and return the emitted document.
    pub fn augment_stack_file(&self, stack_file: &str) -> Result<String> {
        let content = document::read_stack_file(stack_file, &self.config.working_dir)?;
        let parsed = document::parse(stack_file, &content)?;
        let augmented = StackAugmenter::new(&self.config).augment(&parsed)?;
        debug!(
            stack_file,
            secrets = augmented.secrets.len(),
            configs = augmented.configs.len(),
            "augmented"
        );
        document::emit(&augmented.document)
    }

    /// Scan `args` (program name excluded) and augment every stack file.
    ///
    /// Stack files are processed in argument order. If one fails, artifacts
    /// already written are removed before the error is returned.
    pub fn prepare(&self, args: &[String]) -> Result<PreparedDeploy> {
        let stack_files = scan_stack_files(args, &self.config)?;
        let mut artifacts = ArtifactSet::new();

        for stack_file in &stack_files {
            if artifacts.contains(&stack_file.value) {
                return Err(DeployError::DuplicateStackFile(stack_file.value.clone()));
            }
            let augmented = self
                .augment_stack_file(&stack_file.value)
                .map_err(|e| DeployError::in_stack_file(&stack_file.value, e))?;
            if self.config.verbose {
                info!("augmented stack file for {}:\n\n{}", stack_file.value, augmented);
            }
            let artifact = TemporaryArtifact::create(&augmented, self.config.temp_dir.as_deref())?;
            artifacts.insert(stack_file.value.clone(), artifact);
        }

        let forwarded = forward::rewrite_args(args, &stack_files, &artifacts)?;
        Ok(PreparedDeploy {
            args: forwarded,
            stack_files,
            artifacts,
        })
    }

    /// Augment, run docker, clean up. Returns docker's exit status.
    pub fn run(&self, args: &[String]) -> Result<ExitStatus> {
        let prepared = self.prepare(args)?;
        let docker = forward::locate_executable(&self.config.docker_candidates)?;
        let status = forward::run(&docker, &prepared.args, &self.config.working_dir)?;
        if status.success() {
            info!("success");
        }
        Ok(status)
    }
}
