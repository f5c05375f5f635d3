//! Stamp and describe pipelines, extracted from the CLI.
//!
//! Git access goes through [`GitPort`] and artifact output through
//! [`WritePort`]; the manifest itself is read and written by
//! [`ManifestSettings`].

use crate::adapters::ManifestSettings;
use crate::hooks::HookPipeline;
use crate::injector::VersionInjector;
use crate::ports::WritePort;
use crate::report::{STAMP_REPORT_V1, StampReport, StampStatus, ToolInfo};
use crate::settings::StampSettings;
use anyhow::Context;
use camino::Utf8Path;
use chrono::Utc;
use stampkit_edit::EditError;
use stampkit_git::{GitPort, GitVersion, ResolveError};
use tracing::{debug, info, warn};

/// Error type for pipeline results.  Exit code 2 = policy block, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("policy block: {0}")]
    PolicyBlock(String),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::PolicyBlock(_) => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

impl From<EditError> for ToolError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::PolicyBlock(block) => ToolError::PolicyBlock(block.to_string()),
            EditError::Runtime(e) => ToolError::Internal(e),
        }
    }
}

/// Outcome of `run_stamp`.
pub struct StampOutcome {
    pub report: StampReport,
    pub patch: String,
}

/// Run the pre-build hooks against the configured manifest.
///
/// In dry-run mode the patch and report are produced but the manifest is
/// left untouched.
pub fn run_stamp(
    settings: &StampSettings,
    git: &dyn GitPort,
    tool: ToolInfo,
) -> Result<StampOutcome, ToolError> {
    let started_at = Utc::now();
    let manifest_path = settings.manifest_path();
    let mut manifest = ManifestSettings::open(&manifest_path)?;

    let source = GitVersion::new(git, settings.repo_root.clone(), settings.version_options());
    let mut hooks = HookPipeline::new();
    hooks.register(VersionInjector::new(source, settings.placeholder.clone()));

    let build = hooks.run(&mut manifest).context("run pre-build hooks")?;
    let patch = manifest.patch(&settings.manifest);

    let written = if settings.dry_run {
        if manifest.is_modified() {
            info!(manifest = %manifest_path, "dry-run: manifest not written");
        }
        false
    } else {
        manifest.commit()?
    };

    let status = StampStatus::from_build(&build);
    if status == StampStatus::Warn {
        warn!(manifest = %manifest_path, "version left unchanged");
    }
    debug!(?status, written, patch_bytes = patch.len(), "stamp finished");

    let report = StampReport {
        schema: STAMP_REPORT_V1.to_string(),
        tool,
        started_at,
        ended_at: Utc::now(),
        manifest: settings.manifest.to_string(),
        field: manifest.field().to_string(),
        status,
        dry_run: settings.dry_run,
        written,
        build,
    };

    Ok(StampOutcome { report, patch })
}

/// Write `stamp.json` and `patch.diff` to the output directory.
pub fn write_stamp_artifacts(
    outcome: &StampOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let report_json =
        serde_json::to_string_pretty(&outcome.report).context("serialize stamp report")?;
    writer.write_file(&out_dir.join("stamp.json"), report_json.as_bytes())?;
    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;

    Ok(())
}

/// Resolve the version the stamp pipeline would use, without touching anything.
pub fn run_describe(settings: &StampSettings, git: &dyn GitPort) -> Result<String, ResolveError> {
    GitVersion::new(git, settings.repo_root.clone(), settings.version_options()).try_get_version()
}
