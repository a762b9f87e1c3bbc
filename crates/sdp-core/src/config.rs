use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Number of hex characters of the SHA-1 digest embedded in rotated names.
pub const DIGEST_HEX_LEN: usize = 12;

/// Object names longer than this may be rejected by docker.
pub const MAX_OBJECT_NAME_LEN: usize = 64;

/// Environment variables that switch on verbose output when set to `1`.
pub const VERBOSE_ENV_VARS: [&str; 2] = ["DOCKER_SWARM_DEPLOY_VERBOSE", "SWARM_DEPLOYER_VERBOSE"];

/// Which escape hatches exempt an object from rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscapeHatches {
    /// Objects declared `external: true` keep their key.
    pub external: bool,
    /// Objects with an explicit `name:` keep their key.
    pub explicit_name: bool,
}

impl Default for EscapeHatches {
    fn default() -> Self {
        Self {
            external: true,
            explicit_name: true,
        }
    }
}

impl EscapeHatches {
    /// Rotate every object that has a `file`, regardless of `external`/`name`.
    pub fn none() -> Self {
        Self {
            external: false,
            explicit_name: false,
        }
    }
}

/// Configuration for one deploy run.
///
/// Passed explicitly to the scanner, augmenter and forwarder; nothing reads
/// process-wide state after [`DeployConfig::from_env`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Tokens that introduce a stack-file argument.
    pub selectors: Vec<String>,
    /// Which declarations are exempt from rotation.
    pub escape_hatches: EscapeHatches,
    /// Well-known docker install paths, checked in order.
    pub docker_candidates: Vec<PathBuf>,
    /// Directory relative `file` and `env_file` paths resolve against.
    pub working_dir: PathBuf,
    /// Where augmented stack files are written. System temp dir when `None`.
    pub temp_dir: Option<PathBuf>,
    /// Log augmentation decisions and the rewritten documents.
    pub verbose: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            selectors: vec!["-c".into(), "--compose-file".into()],
            escape_hatches: EscapeHatches::default(),
            docker_candidates: vec![
                "/bin/docker".into(),
                "/usr/bin/docker".into(),
                "/usr/local/bin/docker".into(),
            ],
            working_dir: PathBuf::from("."),
            temp_dir: None,
            verbose: false,
        }
    }
}

impl DeployConfig {
    /// Defaults plus the current directory and the verbosity variables.
    pub fn from_env() -> std::io::Result<Self> {
        Ok(Self {
            working_dir: std::env::current_dir()?,
            verbose: verbose_from_env(|name| std::env::var(name).ok()),
            ..Default::default()
        })
    }

    /// Only accept `-c` as a stack-file selector.
    pub fn short_selector_only(mut self) -> Self {
        self.selectors = vec!["-c".into()];
        self
    }

    /// Builder-style working directory override.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Whether `token` is one of the configured selectors.
    pub fn is_selector(&self, token: &str) -> bool {
        self.selectors.iter().any(|s| s == token)
    }
}

/// Verbose when any of [`VERBOSE_ENV_VARS`] equals `"1"`.
pub fn verbose_from_env(lookup: impl Fn(&str) -> Option<String>) -> bool {
    VERBOSE_ENV_VARS
        .iter()
        .any(|name| lookup(name).as_deref() == Some("1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selectors() {
        let config = DeployConfig::default();
        assert!(config.is_selector("-c"));
        assert!(config.is_selector("--compose-file"));
        assert!(!config.is_selector("-f"));
    }

    #[test]
    fn short_selector_only_drops_long_form() {
        let config = DeployConfig::default().short_selector_only();
        assert!(config.is_selector("-c"));
        assert!(!config.is_selector("--compose-file"));
    }

    #[test]
    fn verbose_accepts_either_variable() {
        assert!(verbose_from_env(|n| (n == "SWARM_DEPLOYER_VERBOSE").then(|| "1".into())));
        assert!(verbose_from_env(|n| {
            (n == "DOCKER_SWARM_DEPLOY_VERBOSE").then(|| "1".into())
        }));
        assert!(!verbose_from_env(|_| Some("true".into())));
        assert!(!verbose_from_env(|_| None));
    }

    #[test]
    fn escape_hatches_on_by_default() {
        assert_eq!(
            EscapeHatches::default(),
            EscapeHatches {
                external: true,
                explicit_name: true
            }
        );
        assert!(!EscapeHatches::none().external);
    }
}
