//! Configuration file loading for stampkit.
//!
//! Discovers and loads `stampkit.toml` from the repository root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use stampkit_core::settings::StampSettings;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "stampkit.toml";

/// Top-level configuration from stampkit.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StampkitConfig {
    /// Version stamping settings.
    pub version: VersionConfig,

    /// Artifact output settings.
    pub output: OutputConfig,
}

/// `[version]` section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionConfig {
    /// Placeholder token replaced by the resolved version.
    pub placeholder: Option<String>,

    /// Prefix stripped from tags before parsing.
    pub tag_prefix: Option<String>,

    /// Glob passed to `git describe --match`.
    #[serde(rename = "match")]
    pub match_pattern: Option<String>,

    /// Pre-release identifier for dirty work trees.
    pub dirty_suffix: Option<String>,

    /// Manifest to stamp, relative to the repository root.
    pub manifest: Option<Utf8PathBuf>,
}

/// `[output]` section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory for stamp.json and patch.diff, relative to the repository root.
    pub out_dir: Option<Utf8PathBuf>,
}

/// Discover the stampkit.toml config file.
///
/// Returns `None` if no config file is found in the repository root.
pub fn discover_config(repo_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = repo_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a stampkit.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<StampkitConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<StampkitConfig> {
    let config: StampkitConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from repo root, or return default if not found.
pub fn load_or_default(repo_root: &Utf8Path) -> anyhow::Result<StampkitConfig> {
    match discover_config(repo_root) {
        Some(path) => load_config(&path),
        None => Ok(StampkitConfig::default()),
    }
}

/// Resolution flags shared by `stamp` and `describe`, as given on the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub repo_root: Utf8PathBuf,
    pub manifest: Option<Utf8PathBuf>,
    pub out_dir: Option<Utf8PathBuf>,
    pub placeholder: Option<String>,
    pub tag_prefix: Option<String>,
    pub match_pattern: Option<String>,
    pub dirty_suffix: Option<String>,
    pub apply: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: StampkitConfig,
}

impl ConfigMerger {
    /// Create a new merger from a loaded config.
    pub fn new(config: StampkitConfig) -> Self {
        Self { config }
    }

    /// Produce pipeline settings. Each CLI value replaces the config value,
    /// which replaces the built-in default.
    pub fn merge(self, cli: CliOverrides) -> StampSettings {
        let defaults = StampSettings::default();
        let version = self.config.version;
        let repo_root = cli.repo_root;

        let out_dir = cli
            .out_dir
            .or(self.config.output.out_dir)
            .map(|d| if d.is_absolute() { d } else { repo_root.join(d) })
            .unwrap_or_else(|| repo_root.join("artifacts").join("stampkit"));

        StampSettings {
            manifest: cli.manifest.or(version.manifest).unwrap_or(defaults.manifest),
            out_dir,
            placeholder: cli
                .placeholder
                .or(version.placeholder)
                .unwrap_or(defaults.placeholder),
            tag_prefix: cli
                .tag_prefix
                .or(version.tag_prefix)
                .unwrap_or(defaults.tag_prefix),
            match_pattern: cli.match_pattern.or(version.match_pattern),
            dirty_suffix: cli.dirty_suffix.or(version.dirty_suffix),
            dry_run: !cli.apply,
            repo_root,
        }
    }
}
