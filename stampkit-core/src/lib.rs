//! Embeddable core library for stampkit.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into a build driver or other host process.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`VersionSource`](ports::VersionSource): resolve a version string
//! - [`BuildSettings`](ports::BuildSettings): read and write the build's version
//! - [`WritePort`](ports::WritePort): write artifacts and create directories
//!
//! The [`adapters`] module provides default implementations backed by git,
//! Cargo manifests and the filesystem.
//!
//! # Entry points
//!
//! - [`HookPipeline`](hooks::HookPipeline): run prioritized pre-build hooks
//! - [`run_stamp`](pipeline::run_stamp): stamp a manifest version from git tags
//! - [`run_describe`](pipeline::run_describe): resolve the version without stamping

pub mod adapters;
pub mod hooks;
pub mod injector;
pub mod pipeline;
pub mod ports;
pub mod report;
pub mod settings;

// Re-export the git port so callers don't need stampkit-git directly.
pub use stampkit_git::{GitPort, ResolveError, ShellGitPort};
