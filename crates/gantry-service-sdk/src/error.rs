//! Service error types.

use thiserror::Error;

/// Errors a service may raise from lifecycle hooks and command handlers.
///
/// The host records hook errors and moves on; returning `Err` never rolls
/// back a lifecycle transition.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A lifecycle hook could not complete.
    #[error("Hook failed: {0}")]
    Hook(String),

    /// A capability the service asked for is unavailable on this host.
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// The resolved configuration is missing or malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Service-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Service result type
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ServiceError::Hook("socket refused".to_string());
        assert_eq!(err.to_string(), "Hook failed: socket refused");

        let err = ServiceError::InvalidConfig("port out of range".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: port out of range");
    }

    #[test]
    fn test_serde_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: ServiceError = parse.err().map(ServiceError::from).unwrap();
        assert!(err.to_string().starts_with("Serialization error:"));
    }
}
