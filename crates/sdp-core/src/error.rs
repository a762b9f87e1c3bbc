use std::fmt;
use std::path::PathBuf;

/// The two object namespaces of a stack description.
///
/// Secrets and configs are rotated independently; the same key may appear in
/// both without colliding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    Secrets,
    Configs,
}

impl Namespace {
    /// The top-level (and per-service) key of this namespace.
    pub fn key(self) -> &'static str {
        match self {
            Self::Secrets => "secrets",
            Self::Configs => "configs",
        }
    }

    /// Singular noun used in messages.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Secrets => "secret",
            Self::Configs => "config",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Errors that abort a deploy run.
///
/// None of these are retried. Temporary artifacts created before the failure
/// are still removed.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The command line has an unusable shape.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The same stack file was passed more than once.
    #[error("repeated stack file {0}")]
    DuplicateStackFile(String),

    /// The stack document could not be parsed.
    #[error("failed to parse stack file {stack_file}: {source}")]
    ParseFailure {
        stack_file: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A non-external object declares no `file`.
    #[error("file path not set in {} '{key}', not supported", .namespace.singular())]
    MissingFileReference { namespace: Namespace, key: String },

    /// A referenced path does not exist.
    #[error("did not find file at path {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// The document uses a shape this tool does not rewrite.
    #[error("{0}")]
    UnsupportedSyntax(String),

    /// `env_file` is neither a string nor a list of strings.
    #[error(
        "env_file in service '{service}' was not defined as either a string or a list. \
         This is invalid according to the compose spec"
    )]
    InvalidEnvFileSyntax { service: String },

    /// A service references an object that is not declared.
    #[error("service '{service}' references undeclared {} '{source_key}'", .namespace.singular())]
    DanglingReference {
        namespace: Namespace,
        service: String,
        source_key: String,
    },

    /// None of the well-known docker install paths exist.
    #[error("docker executable not found (looked in {})", display_paths(.candidates))]
    ExecutableNotFound { candidates: Vec<PathBuf> },

    /// Failure while augmenting a specific stack file.
    #[error("stack file {stack_file}: {source}")]
    InStackFile {
        stack_file: String,
        #[source]
        source: Box<DeployError>,
    },

    /// I/O error on a specific path.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The augmented document could not be serialized.
    #[error("failed to serialize augmented stack file: {0}")]
    Emit(#[source] serde_yaml::Error),

    /// The docker child process could not be started.
    #[error("failed to run {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeployError {
    /// Create an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap an error with the stack file it was raised for.
    pub fn in_stack_file(stack_file: impl Into<String>, source: DeployError) -> Self {
        Self::InStackFile {
            stack_file: stack_file.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, skipping stack-file context wrappers.
    pub fn root(&self) -> &DeployError {
        match self {
            Self::InStackFile { source, .. } => source.root(),
            other => other,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result alias for deploy operations.
pub type Result<T> = std::result::Result<T, DeployError>;
