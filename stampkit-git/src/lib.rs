//! Semantic versions from git tag history.
//!
//! The version of a checkout is derived from the most recent tag matching a
//! pattern (by default `v[0-9]*`) and the number of commits since that tag:
//! a checkout five commits past `v1.2` resolves to `1.2.5`.
//!
//! All git access goes through the [`GitPort`](ports::GitPort) trait so the
//! resolver can be driven by the real `git` binary ([`ShellGitPort`]) or by
//! a scripted port in tests.

pub mod adapters;
pub mod describe;
pub mod error;
pub mod ports;
pub mod version;

pub use adapters::ShellGitPort;
pub use describe::{Describe, parse_describe, version_from_tag};
pub use error::ResolveError;
pub use ports::GitPort;
pub use version::{GitVersion, VersionOptions};
