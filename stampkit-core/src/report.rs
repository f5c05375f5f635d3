//! Serializable record of a stamp run.

use crate::hooks::{BuildReport, HookStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STAMP_REPORT_V1: &str = "stampkit.stamp.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampStatus {
    /// The manifest had no placeholder.
    Unchanged,
    /// A version was stamped (written, or previewed in dry-run).
    Stamped,
    /// A placeholder was present but no version could be resolved.
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub manifest: String,
    /// `package.version` or `workspace.package.version`.
    pub field: String,
    pub status: StampStatus,
    pub dry_run: bool,
    /// Whether the manifest on disk was rewritten.
    pub written: bool,
    pub build: BuildReport,
}

impl StampStatus {
    pub fn from_build(build: &BuildReport) -> Self {
        if build.hooks.iter().any(|h| h.status == HookStatus::Warned) {
            StampStatus::Warn
        } else if build.changed() {
            StampStatus::Stamped
        } else {
            StampStatus::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookReport;

    fn build(before: &str, after: &str, status: HookStatus) -> BuildReport {
        BuildReport {
            version_before: before.to_string(),
            version_after: after.to_string(),
            hooks: vec![HookReport {
                hook: "version-injector".to_string(),
                callback_order: 0,
                status,
                message: None,
            }],
        }
    }

    #[test]
    fn status_reflects_hook_outcome() {
        assert_eq!(
            StampStatus::from_build(&build("$git", "1.0.0", HookStatus::Applied)),
            StampStatus::Stamped
        );
        assert_eq!(
            StampStatus::from_build(&build("1.0.0", "1.0.0", HookStatus::Skipped)),
            StampStatus::Unchanged
        );
        assert_eq!(
            StampStatus::from_build(&build("$git", "$git", HookStatus::Warned)),
            StampStatus::Warn
        );
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&StampStatus::Unchanged).unwrap(),
            "\"unchanged\""
        );
        assert_eq!(
            serde_json::to_value(HookStatus::Warned).unwrap(),
            serde_json::json!("warned")
        );
    }
}
