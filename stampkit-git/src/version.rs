//! Version computation from the nearest matching tag.

use crate::describe::{parse_describe, version_from_tag};
use crate::error::ResolveError;
use crate::ports::GitPort;
use camino::Utf8PathBuf;
use semver::{BuildMetadata, Prerelease, Version};
use tracing::{debug, info};

/// Options controlling which tags count and how the version is decorated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionOptions {
    /// Prefix stripped from tags before parsing (`v` for `v1.2`).
    pub tag_prefix: String,
    /// Glob passed to `git describe --match`. Defaults to `<prefix>[0-9]*`.
    pub match_pattern: Option<String>,
    /// Pre-release identifier appended when the work tree has local changes.
    pub dirty_suffix: Option<String>,
}

impl Default for VersionOptions {
    fn default() -> Self {
        Self {
            tag_prefix: "v".to_string(),
            match_pattern: None,
            dirty_suffix: None,
        }
    }
}

impl VersionOptions {
    pub fn match_pattern(&self) -> String {
        self.match_pattern
            .clone()
            .unwrap_or_else(|| format!("{}[0-9]*", self.tag_prefix))
    }
}

/// Resolves the semantic version of a checkout.
///
/// The patch component is the tag's patch plus the number of commits since
/// the tag, so `v1.2` with 5 commits on top is `1.2.5` and `v1.2.3` with 2
/// commits is `1.2.5`. Any pre-release on the tag only survives when `HEAD`
/// is exactly on the tag.
#[derive(Debug, Clone)]
pub struct GitVersion<G> {
    git: G,
    repo_root: Utf8PathBuf,
    options: VersionOptions,
}

impl<G: GitPort> GitVersion<G> {
    pub fn new(git: G, repo_root: impl Into<Utf8PathBuf>, options: VersionOptions) -> Self {
        Self {
            git,
            repo_root: repo_root.into(),
            options,
        }
    }

    pub fn resolve(&self) -> Result<Version, ResolveError> {
        if !self.git.is_available() {
            return Err(ResolveError::GitUnavailable);
        }
        if !self.git.is_repository(&self.repo_root) {
            return Err(ResolveError::NotARepository {
                path: self.repo_root.to_string(),
            });
        }

        let pattern = self.options.match_pattern();
        let line = self
            .git
            .describe(&self.repo_root, &pattern)?
            .ok_or_else(|| ResolveError::NoMatchingTag {
                pattern: pattern.clone(),
            })?;
        let describe = parse_describe(&line)?;
        debug!(
            tag = describe.tag.as_str(),
            distance = describe.distance,
            commit = describe.commit.as_str(),
            "described HEAD"
        );

        let mut version = version_from_tag(&describe.tag, &self.options.tag_prefix)?;
        version.build = BuildMetadata::EMPTY;
        if describe.distance > 0 {
            version.patch = version
                .patch
                .checked_add(describe.distance)
                .ok_or_else(|| ResolveError::InvalidTag {
                    tag: describe.tag.clone(),
                })?;
            version.pre = Prerelease::EMPTY;
        }

        if let Some(suffix) = &self.options.dirty_suffix
            && self.git.is_dirty(&self.repo_root)?
        {
            version.pre = Prerelease::new(suffix).map_err(|_| ResolveError::InvalidSuffix {
                suffix: suffix.clone(),
            })?;
        }

        info!(version = %version, tag = describe.tag.as_str(), "resolved version from git");
        Ok(version)
    }

    /// Resolve and render the version as a string.
    pub fn try_get_version(&self) -> Result<String, ResolveError> {
        self.resolve().map(|v| v.to_string())
    }
}
