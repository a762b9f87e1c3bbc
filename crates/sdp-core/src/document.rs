use std::io::Read;
use std::path::Path;

use serde_yaml::Value;

use crate::error::{DeployError, Result};
use crate::paths;

/// Stack file argument meaning "read from standard input".
pub const STDIN_MARKER: &str = "-";

/// Read the raw text of a stack file argument.
///
/// Relative paths resolve against `working_dir`; [`STDIN_MARKER`] reads stdin.
pub fn read_stack_file(stack_file: &str, working_dir: &Path) -> Result<String> {
    if stack_file == STDIN_MARKER {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| DeployError::io("/dev/stdin", e))?;
        return Ok(content);
    }

    let path = paths::absolutize(stack_file, working_dir);
    std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DeployError::FileNotFound { path },
        _ => DeployError::io(path, e),
    })
}

/// Parse stack file text into a document tree.
///
/// Merge keys (`<<: *anchor`) are resolved, so inherited `secrets`/`configs`
/// lists are rewritten like any other.
pub fn parse(stack_file: &str, content: &str) -> Result<Value> {
    let parse_failure = |source: serde_yaml::Error| DeployError::ParseFailure {
        stack_file: stack_file.to_string(),
        source,
    };
    let mut document: Value = serde_yaml::from_str(content).map_err(parse_failure)?;
    document.apply_merge().map_err(parse_failure)?;
    Ok(document)
}

/// Serialize a document tree back to text.
pub fn emit(document: &Value) -> Result<String> {
    serde_yaml::to_string(document).map_err(DeployError::Emit)
}
