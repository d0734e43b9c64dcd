use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfraError {
    #[error("Invalid credentials for user '{0}'. Check the username and password and try again")]
    InvalidCredentials(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<std::io::Error> for InfraError {
    fn from(err: std::io::Error) -> Self {
        InfraError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(err: serde_json::Error) -> Self {
        InfraError::Storage(format!("malformed storage file: {}", err))
    }
}

impl From<anyhow::Error> for InfraError {
    fn from(err: anyhow::Error) -> Self {
        InfraError::Unknown(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_message_names_user() {
        let err = InfraError::InvalidCredentials("wrong".to_string());
        let text = err.to_string();
        assert!(text.contains("'wrong'"));
        assert!(!text.is_empty());
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(InfraError::from(io), InfraError::Storage(_)));
    }
}
