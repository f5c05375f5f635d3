//! Pre-build hook that stamps a git-derived version into the build settings.

use crate::hooks::{HookReport, HookStatus, PreBuildHook};
use crate::ports::{BuildSettings, VersionSource};
use tracing::{info, warn};

/// Name used in log lines emitted by the injector.
pub const TOOL_NAME: &str = "stampkit";

/// Placeholder replaced by the resolved version when none is configured.
pub const DEFAULT_PLACEHOLDER: &str = "$git";

/// Whether `version` contains `placeholder`, ignoring ASCII case.
pub fn contains_placeholder(version: &str, placeholder: &str) -> bool {
    !placeholder.is_empty()
        && version
            .to_ascii_lowercase()
            .contains(&placeholder.to_ascii_lowercase())
}

/// Replace every occurrence of `placeholder` in `version`, ignoring ASCII case.
pub fn replace_placeholder(version: &str, placeholder: &str, replacement: &str) -> String {
    if placeholder.is_empty() {
        return version.to_string();
    }

    // ASCII lowering keeps byte offsets, so indices found in the folded
    // copy are valid in `version`.
    let haystack = version.to_ascii_lowercase();
    let needle = placeholder.to_ascii_lowercase();

    let mut out = String::with_capacity(version.len() + replacement.len());
    let mut last = 0;
    for (idx, _) in haystack.match_indices(&needle) {
        out.push_str(&version[last..idx]);
        out.push_str(replacement);
        last = idx + needle.len();
    }
    out.push_str(&version[last..]);
    out
}

/// Replaces a placeholder in the build version with a resolved version.
///
/// Runs at callback order 0. Resolution failures are logged as warnings and
/// leave the version untouched; they never fail the build.
pub struct VersionInjector<S> {
    source: S,
    placeholder: String,
}

impl<S: VersionSource> VersionInjector<S> {
    pub const CALLBACK_ORDER: i32 = 0;

    pub fn new(source: S, placeholder: impl Into<String>) -> Self {
        Self {
            source,
            placeholder: placeholder.into(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }
}

impl<S: VersionSource> PreBuildHook for VersionInjector<S> {
    fn name(&self) -> &str {
        "version-injector"
    }

    fn callback_order(&self) -> i32 {
        Self::CALLBACK_ORDER
    }

    fn on_preprocess_build(&self, settings: &mut dyn BuildSettings) -> anyhow::Result<HookReport> {
        let current = settings.version()?;

        if !contains_placeholder(&current, &self.placeholder) {
            info!(
                tool = TOOL_NAME,
                "version placeholder not found; to use automatic semantic versioning with git, \
                 write the placeholder {} into the version",
                self.placeholder
            );
            return Ok(HookReport::new(self, HookStatus::Skipped)
                .with_message(format!("placeholder {} not found", self.placeholder)));
        }

        info!(
            tool = TOOL_NAME,
            version = current.as_str(),
            "version placeholder found; calculating semantic version from git tags"
        );

        let resolved = match self.source.resolve_version() {
            Ok(v) => v,
            Err(e) => {
                warn!(
                    tool = TOOL_NAME,
                    error = %format!("{e:#}"),
                    "could not resolve version; keeping {}",
                    current
                );
                return Ok(HookReport::new(self, HookStatus::Warned)
                    .with_message(format!("version resolution failed: {e:#}")));
            }
        };

        let stamped = replace_placeholder(&current, &self.placeholder, &resolved);
        settings.set_version(&stamped)?;
        info!(
            tool = TOOL_NAME,
            resolved = resolved.as_str(),
            version = stamped.as_str(),
            "stamped version"
        );

        Ok(HookReport::new(self, HookStatus::Applied).with_message(format!("{current} -> {stamped}")))
    }
}
