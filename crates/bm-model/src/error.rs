//! Error types for the model layer

/// Model-level parse and validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Identifier is not a valid ULID
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// Point value could not be parsed
    #[error("invalid point: {0}")]
    InvalidPoint(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_display() {
        let err = ModelError::InvalidId("zz".to_string());
        assert_eq!(err.to_string(), "invalid id: zz");

        let err = ModelError::InvalidPoint("abc".to_string());
        assert!(err.to_string().contains("invalid point"));
    }
}
