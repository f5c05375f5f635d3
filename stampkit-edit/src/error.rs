//! Error types for stampkit-edit.
//!
//! This module defines error types that distinguish between:
//! - Policy blocks (exit code 2): the manifest must not be written as asked
//! - Runtime errors (exit code 1): I/O errors, parse errors, missing fields

use thiserror::Error;

/// The top-level error type for stampkit-edit operations.
#[derive(Debug, Error)]
pub enum EditError {
    /// A policy block occurred (exit code 2).
    #[error("policy block: {0}")]
    PolicyBlock(#[from] PolicyBlockError),

    /// A runtime/tool error occurred (exit code 1).
    #[error("runtime error: {0:#}")]
    Runtime(#[from] anyhow::Error),
}

/// Policy block errors that should result in exit code 2.
#[derive(Debug, Error)]
pub enum PolicyBlockError {
    /// The manifest changed on disk after it was read.
    #[error("precondition mismatch: {message}")]
    PreconditionMismatch {
        /// Which file changed and how.
        message: String,
    },

    /// The package inherits its version with `version.workspace = true`.
    #[error("inherited version: {message}")]
    InheritedVersion {
        /// Which manifest inherits the version.
        message: String,
    },
}

impl EditError {
    /// Returns true if this is a policy block error (exit code 2).
    pub fn is_policy_block(&self) -> bool {
        matches!(self, EditError::PolicyBlock(_))
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            EditError::PolicyBlock(_) => 2,
            EditError::Runtime(_) => 1,
        }
    }
}

/// Result type alias using EditError.
pub type EditResult<T> = Result<T, EditError>;
