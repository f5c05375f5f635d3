//! Error type for version resolution.
//!
//! Every variant means the same thing to a caller: no version could be
//! resolved. The variants exist so the warning can say why.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("git executable not found on PATH")]
    GitUnavailable,

    #[error("{path} is not inside a git work tree")]
    NotARepository { path: String },

    #[error("no tag matches '{pattern}'")]
    NoMatchingTag { pattern: String },

    #[error("unexpected `git describe` output: '{output}'")]
    MalformedDescribe { output: String },

    #[error("tag '{tag}' is not a MAJOR.MINOR[.PATCH] version")]
    InvalidTag { tag: String },

    #[error("dirty suffix '{suffix}' is not a valid pre-release identifier")]
    InvalidSuffix { suffix: String },

    #[error("git query failed: {0:#}")]
    Git(#[from] anyhow::Error),
}
