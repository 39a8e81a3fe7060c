// ABOUTME: Service manifest discovery.
// ABOUTME: The manifest is opaque to the verifier; it only has to exist.

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Manifest file names, in lookup order.
pub const MANIFEST_FILENAMES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    pub fn discover(dir: &Path) -> Result<Self> {
        MANIFEST_FILENAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .map(|path| Manifest { path })
            .ok_or_else(|| Error::ManifestNotFound(dir.to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the orchestration tool runs in.
    pub fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// File name relative to [`Manifest::dir`].
    pub fn file_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or(self.path.as_os_str())
    }
}
