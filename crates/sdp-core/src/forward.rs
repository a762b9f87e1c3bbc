//! Forwarding the rewritten invocation to docker.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tracing::info;

use crate::args::StackFileArg;
use crate::artifact::ArtifactSet;
use crate::error::{DeployError, Result};

/// Replace each stack-file argument with the path of its augmented artifact.
///
/// All other arguments keep their value and position.
pub fn rewrite_args(
    args: &[String],
    stack_files: &[StackFileArg],
    artifacts: &ArtifactSet,
) -> Result<Vec<String>> {
    let mut forwarded = args.to_vec();
    for stack_file in stack_files {
        let artifact = artifacts.path_for(&stack_file.value).ok_or_else(|| {
            DeployError::InvalidArguments(format!(
                "no augmented stack file for {}",
                stack_file.value
            ))
        })?;
        let slot = forwarded.get_mut(stack_file.position).ok_or_else(|| {
            DeployError::InvalidArguments(format!(
                "stack file position {} out of range",
                stack_file.position
            ))
        })?;
        *slot = stack_file.replaced_with(&artifact.to_string_lossy());
    }
    Ok(forwarded)
}

/// The first candidate that exists as a file.
pub fn locate_executable(candidates: &[PathBuf]) -> Result<PathBuf> {
    candidates
        .iter()
        .find(|candidate| candidate.is_file())
        .cloned()
        .ok_or_else(|| DeployError::ExecutableNotFound {
            candidates: candidates.to_vec(),
        })
}

/// Run `program` with `args`, inheriting environment and stdio, and wait.
pub fn run(program: &Path, args: &[String], working_dir: &Path) -> Result<ExitStatus> {
    info!(
        "running docker command: {} {}",
        program.display(),
        args.join(" ")
    );
    Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .status()
        .map_err(|source| DeployError::Spawn {
            program: program.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::scan_stack_files;
    use crate::artifact::TemporaryArtifact;
    use crate::config::DeployConfig;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn replaces_only_stack_file_positions() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifacts = ArtifactSet::new();
        artifacts.insert("a.yml", TemporaryArtifact::create("a: 1\n", Some(dir.path())).unwrap());
        artifacts.insert("b.yml", TemporaryArtifact::create("b: 1\n", Some(dir.path())).unwrap());
        let a = artifacts.path_for("a.yml").unwrap().to_string_lossy().into_owned();
        let b = artifacts.path_for("b.yml").unwrap().to_string_lossy().into_owned();

        let args = argv(&["stack", "deploy", "-c", "a.yml", "--prune", "--compose-file=b.yml", "app"]);
        let stack_files = vec![
            StackFileArg { position: 3, value: "a.yml".into(), prefix: String::new() },
            StackFileArg { position: 5, value: "b.yml".into(), prefix: "--compose-file=".into() },
        ];
        let forwarded = rewrite_args(&args, &stack_files, &artifacts).unwrap();
        assert_eq!(
            forwarded,
            vec![
                "stack".to_string(),
                "deploy".into(),
                "-c".into(),
                a,
                "--prune".into(),
                format!("--compose-file={b}"),
                "app".into(),
            ]
        );
    }

    #[test]
    fn stdin_marker_is_replaced_by_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = DeployConfig::default().with_working_dir(dir.path());
        let args = argv(&["stack", "deploy", "-c", "-", "app"]);
        let stack_files = scan_stack_files(&args, &config).unwrap();
        let mut artifacts = ArtifactSet::new();
        artifacts.insert("-", TemporaryArtifact::create("services: {}\n", Some(dir.path())).unwrap());

        let forwarded = rewrite_args(&args, &stack_files, &artifacts).unwrap();
        assert_eq!(forwarded[3], artifacts.path_for("-").unwrap().to_string_lossy());
        assert!(!forwarded.iter().any(|arg| arg == "-"));
        assert_eq!(forwarded[4], "app");
    }

    #[test]
    fn missing_artifact_is_an_error() {
        let args = argv(&["-c", "a.yml"]);
        let stack_files = vec![StackFileArg { position: 1, value: "a.yml".into(), prefix: String::new() }];
        let err = rewrite_args(&args, &stack_files, &ArtifactSet::new()).unwrap_err();
        assert!(matches!(err, DeployError::InvalidArguments(_)));
    }

    #[test]
    fn locate_takes_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let second = dir.path().join("docker-b");
        let third = dir.path().join("docker-c");
        std::fs::write(&second, "").unwrap();
        std::fs::write(&third, "").unwrap();
        let found =
            locate_executable(&[dir.path().join("docker-a"), second.clone(), third]).unwrap();
        assert_eq!(found, second);
    }

    #[test]
    fn locate_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate_executable(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, DeployError::ExecutableNotFound { ref candidates } if candidates.len() == 1));
    }

    #[cfg(unix)]
    #[test]
    fn run_reports_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let status = run(Path::new("/bin/sh"), &argv(&["-c", "exit 3"]), dir.path()).unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn run_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&dir.path().join("nope"), &[], dir.path()).unwrap_err();
        assert!(matches!(err, DeployError::Spawn { .. }));
    }
}
