use std::path::{Component, Path, PathBuf};

use crate::error::{DeployError, Result};

/// Make `path` absolute against `working_dir` and normalize it lexically.
///
/// `.` and `..` components are folded without touching the filesystem, so
/// symlinks are preserved as written.
pub fn absolutize(path: &str, working_dir: &Path) -> PathBuf {
    let path = Path::new(path);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    };
    normalize(&joined)
}

/// [`absolutize`], then require the result to exist.
pub fn resolve_existing(path: &str, working_dir: &Path) -> Result<PathBuf> {
    let resolved = absolutize(path, working_dir);
    if !resolved.exists() {
        return Err(DeployError::FileNotFound { path: resolved });
    }
    Ok(resolved)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` stays `/`
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_joins_working_dir() {
        assert_eq!(
            absolutize("./secrets/pw.txt", Path::new("/srv/app")),
            PathBuf::from("/srv/app/secrets/pw.txt")
        );
    }

    #[test]
    fn parent_components_fold() {
        assert_eq!(
            absolutize("../shared/./pw.txt", Path::new("/srv/app")),
            PathBuf::from("/srv/shared/pw.txt")
        );
        assert_eq!(absolutize("/../../etc", Path::new("/x")), PathBuf::from("/etc"));
    }

    #[test]
    fn absolute_path_ignores_working_dir() {
        assert_eq!(
            absolutize("/etc//hosts", Path::new("/srv/app")),
            PathBuf::from("/etc/hosts")
        );
    }

    #[test]
    fn resolve_existing_checks_presence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.env"), "A=1").unwrap();
        assert_eq!(
            resolve_existing("a.env", dir.path()).unwrap(),
            dir.path().join("a.env")
        );
        let err = resolve_existing("b.env", dir.path()).unwrap_err();
        assert!(matches!(err, DeployError::FileNotFound { ref path } if path == &dir.path().join("b.env")));
    }
}
