//! Content-addressed rotation of `secrets` and `configs` declarations.

use std::collections::HashMap;

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::config::{DeployConfig, MAX_OBJECT_NAME_LEN};
use crate::digest::ContentDigest;
use crate::error::{DeployError, Namespace, Result};
use crate::paths;

use super::{describe, key_str};

/// Original object key to final object key, for one namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameTable {
    namespace: Namespace,
    entries: HashMap<String, String>,
}

impl RenameTable {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            entries: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn insert(&mut self, original: impl Into<String>, renamed: impl Into<String>) {
        self.entries.insert(original.into(), renamed.into());
    }

    /// The final key for `original`, if it was declared.
    pub fn resolve(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a single declaration was handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rotation {
    /// `external: true`, left untouched.
    External,
    /// Explicit `name:`, only the file path was made absolute.
    Pinned,
    /// Renamed to `<key>_<digest>`.
    Rotated(ContentDigest),
}

/// Rotate every declaration of one namespace.
///
/// Returns the augmented section, keyed by final key in document order, and
/// the rename table services are rewritten against.
pub fn rotate_objects(
    section: &Mapping,
    namespace: Namespace,
    config: &DeployConfig,
) -> Result<(Mapping, RenameTable)> {
    let mut augmented = Mapping::with_capacity(section.len());
    let mut table = RenameTable::new(namespace);

    for (key, definition) in section {
        let key = key_str(key).ok_or_else(|| {
            DeployError::UnsupportedSyntax(format!(
                "{} key {} is not a string",
                namespace.singular(),
                describe(key)
            ))
        })?;

        let (definition, rotation) = rotate_one(key, definition, namespace, config)?;
        let final_key = match &rotation {
            Rotation::External => {
                debug!(%namespace, key, "external=true, skipping auto-rotation");
                key.to_string()
            }
            Rotation::Pinned => {
                debug!(%namespace, key, "explicit name, skipping auto-rotation");
                key.to_string()
            }
            Rotation::Rotated(digest) => {
                let versioned = digest.versioned_key(key);
                if versioned.len() > MAX_OBJECT_NAME_LEN {
                    warn!(
                        "hashed {} with key and version is longer than {} characters ({}), please shorten it",
                        namespace.singular(),
                        MAX_OBJECT_NAME_LEN,
                        versioned
                    );
                }
                debug!(%namespace, key, renamed = %versioned, "rotated");
                versioned
            }
        };

        table.insert(key, final_key.clone());
        augmented.insert(Value::String(final_key), definition);
    }

    Ok((augmented, table))
}

fn rotate_one(
    key: &str,
    definition: &Value,
    namespace: Namespace,
    config: &DeployConfig,
) -> Result<(Value, Rotation)> {
    let fields = match definition {
        Value::Mapping(fields) => fields,
        Value::Null => {
            return Err(DeployError::MissingFileReference {
                namespace,
                key: key.to_string(),
            })
        }
        other => {
            return Err(DeployError::UnsupportedSyntax(format!(
                "{} '{key}' must be a mapping, found {}",
                namespace.singular(),
                describe(other)
            )))
        }
    };

    let hatches = config.escape_hatches;
    if hatches.external && is_external(fields.get("external")) {
        return Ok((definition.clone(), Rotation::External));
    }

    let file = match fields.get("file") {
        Some(Value::String(file)) if !file.is_empty() => file,
        None | Some(Value::Null) | Some(Value::String(_)) => {
            return Err(DeployError::MissingFileReference {
                namespace,
                key: key.to_string(),
            })
        }
        Some(other) => {
            return Err(DeployError::UnsupportedSyntax(format!(
                "file of {} '{key}' must be a string, found {}",
                namespace.singular(),
                describe(other)
            )))
        }
    };

    let path = paths::resolve_existing(file, &config.working_dir)?;
    let mut rewritten = fields.clone();
    rewritten.insert(
        Value::String("file".into()),
        Value::String(path.to_string_lossy().into_owned()),
    );

    let rotation = if hatches.explicit_name && fields.contains_key("name") {
        Rotation::Pinned
    } else {
        Rotation::Rotated(ContentDigest::of_file(&path)?)
    };

    Ok((Value::Mapping(rewritten), rotation))
}

/// `external: true`, or the legacy `external: {name: ...}` form.
///
/// The YAML 1.1 spellings (`yes`, `on`, `y`) are read as strings by the parser
/// but docker treats them as true.
fn is_external(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => matches!(
            flag.to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "on"
        ),
        Some(Value::Mapping(_)) => true,
        _ => false,
    }
}
