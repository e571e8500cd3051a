use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Transient failure of a downstream system (network, remote API)
    #[error("Backend unavailable: {message}")]
    Backend { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether a later attempt of the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::Storage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Team 'abc' not found");
        assert_eq!(error.to_string(), "Not found: Team 'abc' not found");
    }

    #[test]
    fn test_invalid_input_error() {
        let error = DomainError::invalid_input("Team name cannot be empty");
        assert_eq!(error.to_string(), "Invalid input: Team name cannot be empty");
    }

    #[test]
    fn test_conflict_error() {
        let error = DomainError::conflict("Team name already exists");
        assert_eq!(error.to_string(), "Conflict: Team name already exists");
    }

    #[test]
    fn test_retryable() {
        assert!(DomainError::backend("connection refused").is_retryable());
        assert!(DomainError::storage("poisoned lock").is_retryable());
        assert!(!DomainError::invalid_input("empty").is_retryable());
        assert!(!DomainError::not_found("gone").is_retryable());
        assert!(!DomainError::conflict("dup").is_retryable());
    }
}
