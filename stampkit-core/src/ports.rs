//! Port traits abstracting all I/O away from the hooks.

use camino::Utf8Path;

/// Something that can produce a version string, typically from git tags.
pub trait VersionSource {
    fn resolve_version(&self) -> anyhow::Result<String>;
}

impl<T: VersionSource + ?Sized> VersionSource for &T {
    fn resolve_version(&self) -> anyhow::Result<String> {
        (**self).resolve_version()
    }
}

/// The build configuration owning the version string.
pub trait BuildSettings {
    fn version(&self) -> anyhow::Result<String>;
    fn set_version(&mut self, version: &str) -> anyhow::Result<()>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
