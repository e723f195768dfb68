//! Loader error taxonomy.

use std::path::Path;

use thiserror::Error;

/// Errors raised while discovering, loading, and driving services.
///
/// Every variant is non-fatal to the host: discovery and loading log the
/// error, skip the offending root, package, or descriptor, and keep going.
/// The one fatal condition lives outside this enum, in
/// [`ServiceManager::new`](crate::manager::ServiceManager::new), which
/// refuses to start when a local root directory cannot be created.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A configured root or referenced path does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A root or package exists but cannot be read.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A descriptor or package library violates the expected format.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// No factory answers to the descriptor's entry point.
    #[error("Entry point not found: {0}")]
    EntryPointNotFound(String),

    /// A factory was found but failed to produce an instance.
    #[error("Instantiation failed for entry point '{entry_point}': {reason}")]
    InstantiationFailed { entry_point: String, reason: String },

    /// A lifecycle hook reported an error. The transition completed
    /// regardless; this is a record, never a rollback.
    #[error("Hook '{hook}' failed for service '{service}': {reason}")]
    HookFailure {
        service: String,
        hook: &'static str,
        reason: String,
    },

    /// Filesystem failure outside the classified cases above.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Descriptor serialization failure.
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] serde_json::Error),
}

/// Loader result type
pub type Result<T> = std::result::Result<T, LoaderError>;

impl LoaderError {
    /// Classifies an io error against `path` into the taxonomy.
    pub(crate) fn from_io(err: std::io::Error, path: &Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.display().to_string()),
            std::io::ErrorKind::PermissionDenied => {
                Self::PermissionDenied(path.display().to_string())
            }
            _ => Self::Io(err),
        }
    }
}
