//! `GitPort` backed by the `git` executable.

use crate::ports::GitPort;
use anyhow::Context;
use camino::Utf8Path;
use std::process::{Command, Output};
use tracing::debug;

/// Markers `git describe` prints when no tag is reachable or matches.
const NO_TAG_MARKERS: &[&str] = &["No names found", "No tags can describe", "cannot describe"];

/// Git queries via `std::process::Command`.
#[derive(Debug, Clone, Default)]
pub struct ShellGitPort;

impl ShellGitPort {
    fn run(&self, repo_root: &Utf8Path, args: &[&str]) -> anyhow::Result<Output> {
        debug!(cwd = %repo_root, ?args, "running git");
        Command::new("git")
            .args(args)
            .current_dir(repo_root)
            .output()
            .with_context(|| format!("run git {}", args.join(" ")))
    }
}

impl GitPort for ShellGitPort {
    fn is_available(&self) -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn is_repository(&self, repo_root: &Utf8Path) -> bool {
        self.run(repo_root, &["rev-parse", "--is-inside-work-tree"])
            .map(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).trim() == "true")
            .unwrap_or(false)
    }

    fn describe(&self, repo_root: &Utf8Path, pattern: &str) -> anyhow::Result<Option<String>> {
        let output = self.run(
            repo_root,
            &["describe", "--tags", "--long", "--match", pattern, "HEAD"],
        )?;
        if output.status.success() {
            let line = String::from_utf8(output.stdout).context("git describe output is not utf-8")?;
            return Ok(Some(line.trim().to_string()));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if NO_TAG_MARKERS.iter().any(|m| stderr.contains(m)) {
            debug!(pattern, "no matching tag");
            return Ok(None);
        }
        anyhow::bail!("git describe failed: {}", stderr.trim())
    }

    fn is_dirty(&self, repo_root: &Utf8Path) -> anyhow::Result<bool> {
        let output = self.run(repo_root, &["status", "--porcelain", "--untracked-files=no"])?;
        if !output.status.success() {
            anyhow::bail!(
                "git status failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(!output.stdout.iter().all(|b| b.is_ascii_whitespace()))
    }
}
