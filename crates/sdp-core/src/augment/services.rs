//! Rewriting of per-service `secrets`, `configs` and `env_file` entries.

use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{DeployError, Namespace, Result};
use crate::paths;

use super::objects::RenameTable;
use super::{describe, key_str};

/// Rewrite every service against the two rename tables.
///
/// Only `secrets`, `configs` and `env_file` are touched; everything else in
/// a service passes through as-is.
pub fn rewrite_services(
    services: &Mapping,
    secrets: &RenameTable,
    configs: &RenameTable,
    working_dir: &Path,
) -> Result<Mapping> {
    let mut augmented = Mapping::with_capacity(services.len());
    for (name, definition) in services {
        let service = key_str(name).map(str::to_string).unwrap_or_else(|| describe(name));
        let rewritten = match definition {
            Value::Mapping(fields) => {
                Value::Mapping(rewrite_service(&service, fields, secrets, configs, working_dir)?)
            }
            Value::Null => Value::Null,
            other => {
                return Err(DeployError::UnsupportedSyntax(format!(
                    "service '{service}' must be a mapping, found {}",
                    describe(other)
                )))
            }
        };
        augmented.insert(name.clone(), rewritten);
    }
    Ok(augmented)
}

fn rewrite_service(
    service: &str,
    fields: &Mapping,
    secrets: &RenameTable,
    configs: &RenameTable,
    working_dir: &Path,
) -> Result<Mapping> {
    let mut out = fields.clone();

    for table in [secrets, configs] {
        let key = table.namespace().key();
        if let Some(references) = fields.get(key) {
            let rewritten = rewrite_references(service, references, table)?;
            out.insert(Value::String(key.into()), rewritten);
        }
    }

    if let Some(env_file) = fields.get("env_file") {
        out.insert(
            Value::String("env_file".into()),
            resolve_env_files(service, env_file, working_dir)?,
        );
    }

    Ok(out)
}

/// Rewrite a service's long-syntax reference list.
///
/// Each entry must be a mapping with a `source`; the short string syntax is
/// rejected because it doubles as the in-container target name.
fn rewrite_references(service: &str, references: &Value, table: &RenameTable) -> Result<Value> {
    let namespace = table.namespace();
    let entries = match references {
        Value::Sequence(entries) => entries,
        Value::Null => return Ok(Value::Null),
        other => {
            return Err(DeployError::UnsupportedSyntax(format!(
                "{} in service '{service}' must be a list, found {}",
                namespace.key(),
                describe(other)
            )))
        }
    };

    entries
        .iter()
        .map(|entry| -> Result<Value> {
            let Value::Mapping(fields) = entry else {
                return Err(unsupported_short_syntax(service, entry, namespace));
            };
            let source = fields.get("source").and_then(Value::as_str).ok_or_else(|| {
                DeployError::UnsupportedSyntax(format!(
                    "{} reference in service '{service}' has no string source",
                    namespace.singular()
                ))
            })?;
            let renamed = table
                .resolve(source)
                .ok_or_else(|| DeployError::DanglingReference {
                    namespace,
                    service: service.to_string(),
                    source_key: source.to_string(),
                })?;
            debug!(service, %namespace, source, renamed, "rewrote reference");

            let mut fields = fields.clone();
            fields.insert(Value::String("source".into()), Value::String(renamed.into()));
            Ok(Value::Mapping(fields))
        })
        .collect::<Result<Vec<_>>>()
        .map(Value::Sequence)
}

fn unsupported_short_syntax(service: &str, entry: &Value, namespace: Namespace) -> DeployError {
    DeployError::UnsupportedSyntax(format!(
        "{} {} in service '{service}' was not defined as a mapping. \
         This syntax is unsupported by docker-sdp",
        namespace.singular(),
        describe(entry)
    ))
}

fn resolve_env_files(service: &str, env_file: &Value, working_dir: &Path) -> Result<Value> {
    let invalid = || DeployError::InvalidEnvFileSyntax {
        service: service.to_string(),
    };
    let resolve = |path: &str| -> Result<Value> {
        let resolved = paths::resolve_existing(path, working_dir)?;
        Ok(Value::String(resolved.to_string_lossy().into_owned()))
    };

    match env_file {
        Value::String(path) => resolve(path.as_str()),
        Value::Sequence(entries) => entries
            .iter()
            .map(|path| path.as_str().ok_or_else(invalid).and_then(resolve))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        _ => Err(invalid()),
    }
}
