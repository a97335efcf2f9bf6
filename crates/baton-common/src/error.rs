//! Unified error types for the baton workspace.
//!
//! Every failure a user can hit carries enough context (unit name, path,
//! phase) to be actionable on its own; nothing is reported as a bare
//! message without its subject.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum BatonError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A service description file is malformed or fails validation.
    #[error("invalid configuration file {path}: {message}")]
    Config {
        /// Path of the offending configuration file.
        path: PathBuf,
        /// Description of the invalid content.
        message: String,
    },

    /// A service is reachable from itself through service dependencies.
    #[error("dependency cycle detected through service '{service}'")]
    Cycle {
        /// Name of the service that was re-entered during resolution.
        service: String,
    },

    /// A referenced service has no definition in the workspace.
    #[error("unknown service '{name}': no service directory with a service.yml")]
    UnknownService {
        /// Name of the missing service.
        name: String,
    },

    /// A requested action is not registered for the given builder.
    #[error("unknown action '{action}'. Possible actions are: {valid}")]
    UnknownAction {
        /// The action that was requested.
        action: String,
        /// Comma-separated list of valid actions for the builder.
        valid: String,
    },

    /// An external image build returned a non-zero status.
    #[error("build of '{tag}' failed with exit code {status}")]
    BuildFailed {
        /// Tag of the image whose build failed.
        tag: String,
        /// Exit code reported by the external build tool.
        status: i32,
    },

    /// A required external tool is not installed.
    #[error("'{tool}' not found in PATH. {hint}")]
    ToolNotFound {
        /// Name of the missing binary.
        tool: &'static str,
        /// Installation hint for the operator.
        hint: &'static str,
    },

    /// The starting directory is not inside a managed project tree.
    #[error("no project workspace found above {start} (no ancestor contains .git)")]
    NoWorkspace {
        /// Directory the upward search started from.
        start: PathBuf,
    },

    /// A topology has no entry with the requested name.
    #[error("no topology entry named '{name}' to extend")]
    UnknownEntry {
        /// Name of the missing entry.
        name: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_yaml::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BatonError>;
