//! Port trait abstracting git queries away from version resolution.

use camino::Utf8Path;

/// Git queries needed to compute a version.
pub trait GitPort {
    /// Whether a usable `git` executable is present.
    fn is_available(&self) -> bool;

    /// Whether `repo_root` lies inside a git work tree.
    fn is_repository(&self, repo_root: &Utf8Path) -> bool;

    /// `git describe --tags --long --match <pattern>` for `HEAD`.
    ///
    /// Returns `Ok(None)` when no tag matches the pattern.
    fn describe(&self, repo_root: &Utf8Path, pattern: &str) -> anyhow::Result<Option<String>>;

    fn is_dirty(&self, repo_root: &Utf8Path) -> anyhow::Result<bool>;
}

impl<T: GitPort + ?Sized> GitPort for &T {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn is_repository(&self, repo_root: &Utf8Path) -> bool {
        (**self).is_repository(repo_root)
    }

    fn describe(&self, repo_root: &Utf8Path, pattern: &str) -> anyhow::Result<Option<String>> {
        (**self).describe(repo_root, pattern)
    }

    fn is_dirty(&self, repo_root: &Utf8Path) -> anyhow::Result<bool> {
        (**self).is_dirty(repo_root)
    }
}
