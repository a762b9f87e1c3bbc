//! Stack-file argument scanning.

use std::collections::HashSet;

use crate::config::DeployConfig;
use crate::error::{DeployError, Result};

/// One stack-file reference found on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackFileArg {
    /// Index into the scanned argument vector (program name excluded).
    pub position: usize,
    /// The stack-file path as written, `-` for stdin.
    pub value: String,
    /// Text kept in front of the value when forwarding, e.g. `--compose-file=`.
    pub prefix: String,
}

impl StackFileArg {
    /// The argument to forward once the stack file is replaced by `path`.
    pub fn replaced_with(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }
}

/// Find every stack-file reference in `args`, in order.
///
/// `args` excludes the program name. A reference is the token following a
/// selector, or the inline value of `--selector=value`. The same path may
/// appear only once.
pub fn scan_stack_files(args: &[String], config: &DeployConfig) -> Result<Vec<StackFileArg>> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    let mut pending: Option<&str> = None;

    for (position, token) in args.iter().enumerate() {
        let arg = if pending.take().is_some() {
            StackFileArg {
                position,
                value: token.clone(),
                prefix: String::new(),
            }
        } else if config.is_selector(token) {
            pending = Some(token.as_str());
            continue;
        } else if let Some((selector, value)) = split_inline(token, config) {
            StackFileArg {
                position,
                value: value.to_string(),
                prefix: format!("{selector}="),
            }
        } else {
            continue;
        };

        if !seen.insert(arg.value.clone()) {
            return Err(DeployError::DuplicateStackFile(arg.value));
        }
        found.push(arg);
    }

    if let Some(selector) = pending {
        return Err(DeployError::InvalidArguments(format!(
            "{selector} requires a stack file argument"
        )));
    }

    Ok(found)
}

fn split_inline<'a>(token: &'a str, config: &DeployConfig) -> Option<(&'a str, &'a str)> {
    let (selector, value) = token.split_once('=')?;
    (selector.starts_with("--") && config.is_selector(selector)).then_some((selector, value))
}
