use std::fmt;
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::config::DIGEST_HEX_LEN;
use crate::error::{DeployError, Result};

/// Short SHA-1 version tag of an object's file contents.
///
/// The first [`DIGEST_HEX_LEN`] lowercase hex characters of the SHA-1 of the
/// raw bytes. Depends on nothing but the bytes, so re-deploying an unchanged
/// file yields the same name and docker leaves the service alone.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Digest raw bytes.
    pub fn of_bytes(data: &[u8]) -> Self {
        let full = hex::encode(Sha1::digest(data));
        Self(full[..DIGEST_HEX_LEN].to_string())
    }

    /// Read a file fully and digest its contents.
    pub fn of_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| DeployError::io(path, e))?;
        Ok(Self::of_bytes(&data))
    }

    /// `<key>_<digest>`.
    pub fn versioned_key(&self, key: &str) -> String {
        format!("{key}_{}", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
