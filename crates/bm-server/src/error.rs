//! Error types for the server crate

use bm_service::ServiceError;

/// Server setup and runtime errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Config file could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Environment override has an unusable value
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },

    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Collaborator service failed
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_display() {
        let err = ServerError::InvalidEnv {
            key: "BM_BIND",
            value: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for BM_BIND: nope");

        let err = ServerError::from(ServiceError::ContentEmpty);
        assert!(err.to_string().starts_with("service error"));
    }
}
