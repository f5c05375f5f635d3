//! Default port implementations.

use crate::ports::{BuildSettings, VersionSource, WritePort};
use anyhow::Context;
use camino::Utf8Path;
use stampkit_edit::{EditResult, ManifestSnapshot, VersionField, render_patch, write_manifest};
use stampkit_git::{GitPort, GitVersion};
use tracing::debug;

impl<G: GitPort> VersionSource for GitVersion<G> {
    fn resolve_version(&self) -> anyhow::Result<String> {
        Ok(self.try_get_version()?)
    }
}

/// Build settings backed by the version field of a Cargo manifest.
///
/// Version changes are staged in memory; nothing touches the disk until
/// [`commit`](ManifestSettings::commit).
#[derive(Debug, Clone)]
pub struct ManifestSettings {
    snapshot: ManifestSnapshot,
    field: VersionField,
    version: String,
    staged: Option<String>,
}

impl ManifestSettings {
    pub fn open(path: &Utf8Path) -> EditResult<Self> {
        let snapshot = ManifestSnapshot::read(path)?;
        let (field, version) = snapshot.locate_version()?;
        debug!(path = %path, %field, version = version.as_str(), "opened manifest");
        Ok(Self {
            snapshot,
            field,
            version,
            staged: None,
        })
    }

    pub fn field(&self) -> VersionField {
        self.field
    }

    /// Manifest contents including staged changes.
    pub fn contents(&self) -> &str {
        self.staged.as_deref().unwrap_or(&self.snapshot.contents)
    }

    pub fn is_modified(&self) -> bool {
        self.contents() != self.snapshot.contents
    }

    /// Diff of the staged changes, labelled with `display_path`.
    pub fn patch(&self, display_path: &Utf8Path) -> String {
        render_patch(display_path, &self.snapshot.contents, self.contents())
    }

    /// Write staged changes to disk. Returns whether anything was written.
    pub fn commit(&self) -> EditResult<bool> {
        if !self.is_modified() {
            return Ok(false);
        }
        write_manifest(&self.snapshot, self.contents())?;
        Ok(true)
    }
}

impl BuildSettings for ManifestSettings {
    fn version(&self) -> anyhow::Result<String> {
        Ok(self.version.clone())
    }

    fn set_version(&mut self, version: &str) -> anyhow::Result<()> {
        let updated = stampkit_edit::set_version(&self.snapshot.contents, self.field, version)
            .with_context(|| format!("set {} in {}", self.field, self.snapshot.path))?;
        self.staged = Some(updated);
        self.version = version.to_string();
        Ok(())
    }
}

/// In-memory build settings for embedding and testing.
///
/// Every `set_version` call is recorded.
#[derive(Debug, Clone, Default)]
pub struct InMemorySettings {
    version: String,
    writes: Vec<String>,
}

impl InMemorySettings {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            writes: Vec::new(),
        }
    }

    pub fn writes(&self) -> &[String] {
        &self.writes
    }
}

impl BuildSettings for InMemorySettings {
    fn version(&self) -> anyhow::Result<String> {
        Ok(self.version.clone())
    }

    fn set_version(&mut self, version: &str) -> anyhow::Result<()> {
        self.version = version.to_string();
        self.writes.push(version.to_string());
        Ok(())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs_err::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs_err::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
