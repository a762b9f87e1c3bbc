//! Stack description augmentation.
//!
//! Rotates every file-backed secret and config to a content-addressed name,
//! rewrites service references to match, and makes auxiliary file paths
//! absolute. Every other part of the document is carried over untouched.

pub mod objects;
pub mod services;

use serde_yaml::{Mapping, Value};

use crate::config::DeployConfig;
use crate::error::{DeployError, Namespace, Result};

pub use objects::{rotate_objects, RenameTable, Rotation};
pub use services::rewrite_services;

/// The rewritten document, ready to be emitted to a temporary file.
#[derive(Clone, Debug, PartialEq)]
pub struct AugmentedDescription {
    pub document: Value,
    pub secrets: RenameTable,
    pub configs: RenameTable,
}

/// Applies rotation and reference rewriting to one stack description.
pub struct StackAugmenter<'a> {
    config: &'a DeployConfig,
}

impl<'a> StackAugmenter<'a> {
    pub fn new(config: &'a DeployConfig) -> Self {
        Self { config }
    }

    /// Augment a parsed stack description.
    ///
    /// Relative paths resolve against the configured working directory, not
    /// against the stack file's own directory. Reads object files to digest
    /// them; never writes.
    pub fn augment(&self, description: &Value) -> Result<AugmentedDescription> {
        let root = match description {
            Value::Mapping(root) => root,
            Value::Null => {
                return Ok(AugmentedDescription {
                    document: Value::Null,
                    secrets: RenameTable::new(Namespace::Secrets),
                    configs: RenameTable::new(Namespace::Configs),
                })
            }
            other => {
                return Err(DeployError::UnsupportedSyntax(format!(
                    "stack description must be a mapping, found {}",
                    describe(other)
                )))
            }
        };

        let mut document = root.clone();
        let secrets = self.rotate_section(root, &mut document, Namespace::Secrets)?;
        let configs = self.rotate_section(root, &mut document, Namespace::Configs)?;

        if let Some(services) = section(root, "services")? {
            let services =
                rewrite_services(services, &secrets, &configs, &self.config.working_dir)?;
            document.insert(Value::String("services".into()), Value::Mapping(services));
        }

        Ok(AugmentedDescription {
            document: Value::Mapping(document),
            secrets,
            configs,
        })
    }

    fn rotate_section(
        &self,
        root: &Mapping,
        document: &mut Mapping,
        namespace: Namespace,
    ) -> Result<RenameTable> {
        match section(root, namespace.key())? {
            Some(declared) => {
                let (augmented, table) = rotate_objects(declared, namespace, self.config)?;
                document.insert(Value::String(namespace.key().into()), Value::Mapping(augmented));
                Ok(table)
            }
            None => Ok(RenameTable::new(namespace)),
        }
    }
}

/// A top-level section; absent or null sections are `None`.
fn section<'m>(root: &'m Mapping, key: &str) -> Result<Option<&'m Mapping>> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Mapping(section)) => Ok(Some(section)),
        Some(other) => Err(DeployError::UnsupportedSyntax(format!(
            "top-level '{key}' must be a mapping, found {}",
            describe(other)
        ))),
    }
}

/// Mapping keys are usually strings; anything else is not a usable name.
pub(crate) fn key_str(key: &Value) -> Option<&str> {
    key.as_str()
}

/// Render a value for an error message.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Sequence(_) => "a list".into(),
        Value::Mapping(_) => "a mapping".into(),
        Value::Tagged(tagged) => format!("{}", tagged.tag),
    }
}
