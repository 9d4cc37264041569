//! Error types for svckit-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from descriptor-file persistence.
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (write/save path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parse error on load — includes the offending file path.
    #[error("failed to parse descriptor at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.svckit/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// No saved descriptor file for this service.
    #[error("no saved descriptor for service '{name}'")]
    DescriptorNotFound { name: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigStoreError {
    ConfigStoreError::Io {
        path: path.into(),
        source,
    }
}
