//! Version edits for Cargo manifests.
//!
//! Responsibilities:
//! - Locate the version field of a manifest (`[package]` or `[workspace.package]`).
//! - Rewrite it with `toml_edit`, leaving the rest of the file byte-for-byte intact.
//! - Guard writes with a sha256 precondition taken when the manifest was read.
//! - Generate a unified diff preview.

pub mod error;

pub use error::{EditError, EditResult, PolicyBlockError};

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use fs_err as fs;
use sha2::{Digest, Sha256};
use std::fmt;
use toml_edit::{DocumentMut, Item, TableLike, value};
use tracing::debug;

/// Where a manifest keeps its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionField {
    /// `[package] version = "..."`
    Package,
    /// `[workspace.package] version = "..."`
    WorkspacePackage,
}

impl VersionField {
    fn table_path(&self) -> &'static [&'static str] {
        match self {
            VersionField::Package => &["package"],
            VersionField::WorkspacePackage => &["workspace", "package"],
        }
    }
}

impl fmt::Display for VersionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.version", self.table_path().join("."))
    }
}

fn parse_doc(contents: &str) -> EditResult<DocumentMut> {
    Ok(contents
        .parse::<DocumentMut>()
        .context("manifest is not valid TOML")?)
}

fn table_like<'a>(doc: &'a DocumentMut, path: &[&str]) -> Option<&'a dyn TableLike> {
    let mut item: &Item = doc.as_item();
    for key in path {
        item = item.as_table_like()?.get(key)?;
    }
    item.as_table_like()
}

fn table_like_mut<'a>(doc: &'a mut DocumentMut, path: &[&str]) -> Option<&'a mut dyn TableLike> {
    let mut item: &mut Item = doc.as_item_mut();
    for key in path {
        item = item.as_table_like_mut()?.get_mut(key)?;
    }
    item.as_table_like_mut()
}

/// Find the version field and its current value.
///
/// `[package]` wins over `[workspace.package]`. A package that inherits its
/// version from the workspace is a policy block: the workspace root is the
/// manifest to stamp.
pub fn locate_version(contents: &str) -> EditResult<(VersionField, String)> {
    let doc = parse_doc(contents)?;

    for field in [VersionField::Package, VersionField::WorkspacePackage] {
        let Some(item) = table_like(&doc, field.table_path()).and_then(|t| t.get("version")) else {
            continue;
        };

        if let Some(s) = item.as_str() {
            return Ok((field, s.to_string()));
        }

        let inherits = item
            .as_table_like()
            .and_then(|t| t.get("workspace"))
            .and_then(|w| w.as_bool())
            .unwrap_or(false);
        if inherits {
            return Err(PolicyBlockError::InheritedVersion {
                message: format!("{field} is inherited from the workspace; stamp the workspace root manifest"),
            }
            .into());
        }

        return Err(anyhow::anyhow!("{field} is not a string").into());
    }

    Err(anyhow::anyhow!("manifest has neither package.version nor workspace.package.version").into())
}

/// Replace the version at `field` with `new_version`.
///
/// Comments and whitespace around the value are kept.
pub fn set_version(contents: &str, field: VersionField, new_version: &str) -> EditResult<String> {
    let mut doc = parse_doc(contents)?;
    let table = table_like_mut(&mut doc, field.table_path())
        .with_context(|| format!("missing table for {field}"))?;
    let item = table
        .get_mut("version")
        .with_context(|| format!("missing {field}"))?;

    let decor = item.as_value().map(|v| v.decor().clone());
    *item = value(new_version);
    if let (Some(decor), Some(v)) = (decor, item.as_value_mut()) {
        *v.decor_mut() = decor;
    }

    Ok(doc.to_string())
}

/// Manifest contents captured at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSnapshot {
    pub path: Utf8PathBuf,
    pub contents: String,
    pub sha256: String,
}

impl ManifestSnapshot {
    pub fn read(path: &Utf8Path) -> EditResult<Self> {
        let contents = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
        let sha256 = sha256_hex(contents.as_bytes());
        debug!(path = %path, sha256 = sha256.as_str(), "read manifest");
        Ok(Self {
            path: path.to_path_buf(),
            contents,
            sha256,
        })
    }

    pub fn locate_version(&self) -> EditResult<(VersionField, String)> {
        locate_version(&self.contents)
    }
}

/// Write `new_contents` over the snapshot's file.
///
/// Fails with a precondition mismatch if the file no longer hashes to the
/// snapshot's sha256.
pub fn write_manifest(snapshot: &ManifestSnapshot, new_contents: &str) -> EditResult<()> {
    let path = &snapshot.path;
    let current = match fs::read(path) {
        Ok(bytes) => sha256_hex(&bytes),
        Err(_) => {
            return Err(PolicyBlockError::PreconditionMismatch {
                message: format!("{path} disappeared since it was read"),
            }
            .into());
        }
    };
    if current != snapshot.sha256 {
        return Err(PolicyBlockError::PreconditionMismatch {
            message: format!(
                "{path} changed since it was read: expected sha256 {}, got {current}",
                snapshot.sha256
            ),
        }
        .into());
    }

    fs::write(path, new_contents).with_context(|| format!("write {}", path))?;
    debug!(path = %path, bytes = new_contents.len(), "wrote manifest");
    Ok(())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Unified diff of one file, in `git diff` layout. Empty when unchanged.
pub fn render_patch(path: &Utf8Path, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
    out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

    let patch = diffy::create_patch(before, after);
    let formatter = PatchFormatter::new();
    let body = formatter.fmt_patch(&patch).to_string();
    // diffy repeats the ---/+++ header; keep only the hunks.
    let hunks = body
        .find("@@")
        .map(|idx| &body[idx..])
        .unwrap_or(body.as_str());
    out.push_str(hunks);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn locates_package_version() {
        let (field, v) = locate_version("[package]\nname = \"a\"\nversion = \"0.1.0-$git\"\n").unwrap();
        assert_eq!(field, VersionField::Package);
        assert_eq!(v, "0.1.0-$git");
    }

    #[test]
    fn falls_back_to_workspace_package() {
        let (field, v) =
            locate_version("[workspace]\nmembers = []\n\n[workspace.package]\nversion = \"$git\"\n")
                .unwrap();
        assert_eq!(field, VersionField::WorkspacePackage);
        assert_eq!(v, "$git");
        assert_eq!(field.to_string(), "workspace.package.version");
    }

    #[test]
    fn inherited_version_is_policy_block() {
        let err = locate_version("[package]\nname = \"a\"\nversion.workspace = true\n").unwrap_err();
        assert!(err.is_policy_block());

        let err =
            locate_version("[package]\nname = \"a\"\nversion = { workspace = true }\n").unwrap_err();
        assert!(err.is_policy_block());
    }

    #[test]
    fn missing_version_is_runtime_error() {
        let err = locate_version("[package]\nname = \"a\"\n").unwrap_err();
        assert_eq!(err.exit_code(), 1);

        let err = locate_version("[package]\nversion = 3\n").unwrap_err();
        assert!(err.to_string().contains("not a string"));
    }

    #[test]
    fn set_version_keeps_comments_and_layout() {
        let before = "# top\n[package]\nname = \"a\"\nversion   = \"$git\" # stamped\nedition = \"2021\"\n";
        let after = set_version(before, VersionField::Package, "1.2.3").unwrap();
        assert_eq!(
            after,
            "# top\n[package]\nname = \"a\"\nversion   = \"1.2.3\" # stamped\nedition = \"2021\"\n"
        );
    }

    #[test]
    fn set_version_in_dotted_workspace_table() {
        let before = "[workspace]\nmembers = []\npackage.version = \"$git\"\n";
        let after = set_version(before, VersionField::WorkspacePackage, "0.4.0").unwrap();
        assert_eq!(after, "[workspace]\nmembers = []\npackage.version = \"0.4.0\"\n");
    }

    #[test]
    fn patch_is_empty_when_unchanged() {
        assert_eq!(render_patch(Utf8Path::new("Cargo.toml"), "a\n", "a\n"), "");
    }

    #[test]
    fn patch_has_git_header_and_hunk() {
        let patch = render_patch(
            Utf8Path::new("Cargo.toml"),
            "[package]\nversion = \"$git\"\n",
            "[package]\nversion = \"1.0.0\"\n",
        );
        assert!(patch.starts_with("diff --git a/Cargo.toml b/Cargo.toml\n--- a/Cargo.toml\n+++ b/Cargo.toml\n@@"));
        assert!(patch.contains("-version = \"$git\"\n"));
        assert!(patch.contains("+version = \"1.0.0\"\n"));
        assert_eq!(patch.matches("+++").count(), 1);
    }
}
