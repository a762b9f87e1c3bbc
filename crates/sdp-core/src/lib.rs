//! Automatic secret and config rotation for `docker stack deploy`.
//!
//! Docker swarm treats secrets and configs as immutable by name: a service is
//! only updated when the *name* it references changes. This crate renames
//! every file-backed secret and config to `<key>_<sha1[..12]>` of its file
//! contents, rewrites service references to match, writes the result to a
//! temporary stack file and hands that to docker in place of the original.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sdp_core::{DeployConfig, StackDeployer};
//!
//! let config = DeployConfig::from_env().unwrap();
//! let args: Vec<String> = ["stack", "deploy", "-c", "stack.yml", "app"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let status = StackDeployer::new(config).run(&args).unwrap();
//! std::process::exit(status.code().unwrap_or(1));
//! ```

pub mod args;
pub mod artifact;
pub mod augment;
pub mod config;
pub mod deploy;
pub mod digest;
pub mod document;
pub mod error;
pub mod forward;
pub mod paths;

pub use args::{scan_stack_files, StackFileArg};
pub use artifact::{ArtifactSet, TemporaryArtifact};
pub use augment::{AugmentedDescription, RenameTable, StackAugmenter};
pub use config::{DeployConfig, EscapeHatches, DIGEST_HEX_LEN, MAX_OBJECT_NAME_LEN};
pub use deploy::{PreparedDeploy, StackDeployer};
pub use digest::ContentDigest;
pub use error::{DeployError, Namespace, Result};
