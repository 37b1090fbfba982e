//! Error types for SQL synthesis.

/// Errors raised while generating SQL for a platform.
///
/// Generation is pure, so every error aborts the call before any SQL is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The platform categorically lacks the requested capability.
    #[error("Operation '{feature}' is not supported by platform '{platform}'")]
    UnsupportedFeature {
        /// Platform name.
        platform: String,
        /// Description of the unsupported operation.
        feature: String,
    },

    /// Malformed input handed to the dialect layer.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The type mapper has no declaration rule for a logical type.
    #[error("Type '{type_name}' is not supported by platform '{platform}'")]
    UnsupportedType {
        /// Platform name.
        platform: String,
        /// The logical or native type name that could not be mapped.
        type_name: String,
    },

    /// Invalid platform configuration.
    #[error("Invalid platform configuration: {0}")]
    Configuration(String),

    /// Configuration could not be deserialized.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlatformError {
    /// Creates an [`PlatformError::UnsupportedFeature`] error.
    #[must_use]
    pub fn unsupported(platform: &str, feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            platform: platform.to_string(),
            feature: feature.into(),
        }
    }

    /// Creates an [`PlatformError::InvalidArgument`] error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates an [`PlatformError::UnsupportedType`] error.
    #[must_use]
    pub fn unsupported_type(platform: &str, type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            platform: platform.to_string(),
            type_name: type_name.into(),
        }
    }
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PlatformError::unsupported("firebird", "RENAME TABLE");
        assert_eq!(
            err.to_string(),
            "Operation 'RENAME TABLE' is not supported by platform 'firebird'"
        );

        let err = PlatformError::unsupported_type("sybase", "datetimetz");
        assert_eq!(
            err.to_string(),
            "Type 'datetimetz' is not supported by platform 'sybase'"
        );

        let err = PlatformError::invalid("index has no columns");
        assert_eq!(err.to_string(), "Invalid argument: index has no columns");
    }
}
