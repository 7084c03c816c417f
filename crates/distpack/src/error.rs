//! Error taxonomy for configuration assembly and stage execution

use std::path::PathBuf;

use crate::options::Format;

/// Result alias used throughout the library
pub type Result<T, E = BuildError> = std::result::Result<T, E>;

/// Everything that can go wrong while assembling or running a build configuration
///
/// None of these are retried. Assembly is a pure function of its inputs, so the
/// caller recovers by fixing the offending option and assembling again.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// An option value is invalid or unsupported
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A file referenced by the options does not exist
    #[error("{what} not found at {}", path.display())]
    ResourceNotFound { what: &'static str, path: PathBuf },

    /// A stage failed while transforming a module
    #[error("stage `{stage}` failed while building the {format} bundle")]
    Tooling {
        format: Format,
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl BuildError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check whether this error is a missing-resource failure
    pub fn is_resource_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }

    /// Check whether this error came from an invalid option
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
