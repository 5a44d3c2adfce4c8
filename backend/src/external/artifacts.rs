//! Artifact directory with optional checksum manifest
//!
//! When `manifest.json` is present every file it lists is verified against
//! its sha256 on load, and the manifest version must match the artifacts.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use shared::artifacts::MANIFEST_FILE;
use shared::{ArtifactError, ArtifactManifest, ArtifactSource};

/// Reads artifacts from a local directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    manifest: Option<ArtifactManifest>,
}

impl DirectorySource {
    /// Open `root`, reading the manifest if one exists.
    pub fn open(root: impl Into<PathBuf>, require_manifest: bool) -> Result<Self, ArtifactError> {
        let root = root.into();
        let manifest = match read_file(&root.join(MANIFEST_FILE), MANIFEST_FILE) {
            Ok(bytes) => Some(
                serde_json::from_slice::<ArtifactManifest>(&bytes)
                    .map_err(|e| ArtifactError::malformed(MANIFEST_FILE, e))?,
            ),
            Err(ArtifactError::Missing(_)) if !require_manifest => {
                tracing::warn!(dir = %root.display(), "No artifact manifest, checksums not verified");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self { root, manifest })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> Option<&ArtifactManifest> {
        self.manifest.as_ref()
    }

    fn verify(&self, name: &str, bytes: &[u8]) -> Result<(), ArtifactError> {
        let Some(manifest) = &self.manifest else {
            return Ok(());
        };
        let expected = manifest
            .sha256
            .get(name)
            .ok_or_else(|| ArtifactError::malformed(MANIFEST_FILE, format!("no checksum for '{}'", name)))?;
        if !sha256_hex(bytes).eq_ignore_ascii_case(expected) {
            return Err(ArtifactError::ChecksumMismatch(name.to_string()));
        }
        Ok(())
    }
}

/// Lowercase hex sha256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn read_file(path: &Path, name: &str) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ArtifactError::Missing(name.to_string()),
        _ => ArtifactError::Unreadable {
            name: name.to_string(),
            reason: e.to_string(),
        },
    })
}

impl ArtifactSource for DirectorySource {
    fn load(&self, name: &str) -> Result<Vec<u8>, ArtifactError> {
        // Artifact names are flat file names
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(ArtifactError::Unreadable {
                name: name.to_string(),
                reason: "not a plain file name".to_string(),
            });
        }
        let bytes = read_file(&self.root.join(name), name)?;
        self.verify(name, &bytes)?;
        Ok(bytes)
    }

    fn declared_version(&self) -> Option<&str> {
        self.manifest.as_ref().map(|m| m.version.as_str())
    }
}
