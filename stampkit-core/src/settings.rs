//! Clap-free settings for the stamp and describe pipelines.

use crate::injector::DEFAULT_PLACEHOLDER;
use camino::Utf8PathBuf;
use stampkit_git::VersionOptions;

/// Settings for stamping a manifest.
#[derive(Debug, Clone)]
pub struct StampSettings {
    pub repo_root: Utf8PathBuf,
    /// Manifest to stamp, relative to `repo_root` unless absolute.
    pub manifest: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,

    // Placeholder
    pub placeholder: String,

    // Resolution
    pub tag_prefix: String,
    pub match_pattern: Option<String>,
    pub dirty_suffix: Option<String>,

    // Apply behaviour
    pub dry_run: bool,
}

impl Default for StampSettings {
    fn default() -> Self {
        Self {
            repo_root: Utf8PathBuf::from("."),
            manifest: Utf8PathBuf::from("Cargo.toml"),
            out_dir: Utf8PathBuf::from("artifacts/stampkit"),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            tag_prefix: "v".to_string(),
            match_pattern: None,
            dirty_suffix: None,
            dry_run: true,
        }
    }
}

impl StampSettings {
    pub fn manifest_path(&self) -> Utf8PathBuf {
        if self.manifest.is_absolute() {
            self.manifest.clone()
        } else {
            self.repo_root.join(&self.manifest)
        }
    }

    pub fn version_options(&self) -> VersionOptions {
        VersionOptions {
            tag_prefix: self.tag_prefix.clone(),
            match_pattern: self.match_pattern.clone(),
            dirty_suffix: self.dirty_suffix.clone(),
        }
    }
}
