//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when accessing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    /// True when the config file simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(_, err) if err.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("oven.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        assert!(io_err.to_string().contains("oven.toml"));
        assert!(io_err.is_not_found());

        let validation = ConfigError::Validation("workers must be positive".into());
        assert!(validation.to_string().contains("workers must be positive"));
        assert!(!validation.is_not_found());
    }
}
