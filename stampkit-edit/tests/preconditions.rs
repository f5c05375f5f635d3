//! Snapshot/write precondition tests.

use camino::Utf8PathBuf;
use stampkit_edit::{
    EditError, ManifestSnapshot, PolicyBlockError, VersionField, set_version, sha256_hex,
    write_manifest,
};
use std::fs;
use tempfile::TempDir;

const MANIFEST: &str = r#"[package]
name = "game"
version = "0.1.$git" # stamped at build time
edition = "2021"

[dependencies]
serde = "1"
"#;

fn temp_manifest(contents: &str) -> (TempDir, Utf8PathBuf) {
    let td = tempfile::tempdir().expect("tempdir");
    let path = Utf8PathBuf::from_path_buf(td.path().join("Cargo.toml")).expect("utf8");
    fs::write(&path, contents).expect("write manifest");
    (td, path)
}

#[test]
fn snapshot_records_hash_of_contents() {
    let (_td, path) = temp_manifest(MANIFEST);
    let snap = ManifestSnapshot::read(&path).expect("read");
    assert_eq!(snap.contents, MANIFEST);
    assert_eq!(snap.sha256, sha256_hex(MANIFEST.as_bytes()));
    assert_eq!(
        snap.locate_version().expect("locate"),
        (VersionField::Package, "0.1.$git".to_string())
    );
}

#[test]
fn write_succeeds_when_unchanged() {
    let (_td, path) = temp_manifest(MANIFEST);
    let snap = ManifestSnapshot::read(&path).expect("read");
    let updated = set_version(&snap.contents, VersionField::Package, "0.1.7").expect("edit");

    write_manifest(&snap, &updated).expect("write");

    let on_disk = fs::read_to_string(&path).expect("read back");
    assert!(on_disk.contains("version = \"0.1.7\" # stamped at build time"));
    assert!(on_disk.contains("[dependencies]\nserde = \"1\""));
}

#[test]
fn write_refuses_when_file_changed() {
    let (_td, path) = temp_manifest(MANIFEST);
    let snap = ManifestSnapshot::read(&path).expect("read");
    fs::write(&path, MANIFEST.replace("game", "other")).expect("concurrent edit");

    let err = write_manifest(&snap, "irrelevant").unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(matches!(
        err,
        EditError::PolicyBlock(PolicyBlockError::PreconditionMismatch { .. })
    ));
    assert!(
        fs::read_to_string(&path)
            .expect("read back")
            .contains("other")
    );
}

#[test]
fn write_refuses_when_file_removed() {
    let (_td, path) = temp_manifest(MANIFEST);
    let snap = ManifestSnapshot::read(&path).expect("read");
    fs::remove_file(&path).expect("remove");

    let err = write_manifest(&snap, MANIFEST).unwrap_err();
    assert!(err.is_policy_block());
    assert!(!path.exists());
}

#[test]
fn read_missing_manifest_is_runtime_error() {
    let td = tempfile::tempdir().expect("tempdir");
    let path = Utf8PathBuf::from_path_buf(td.path().join("Cargo.toml")).expect("utf8");
    let err = ManifestSnapshot::read(&path).unwrap_err();
    assert_eq!(err.exit_code(), 1);
}
