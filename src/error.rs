use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Host connection failed: {0}")]
    Connection(String),

    #[error("Malformed host message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Host channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, DeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeckError::Connection("refused".to_string());
        assert_eq!(err.to_string(), "Host connection failed: refused");

        let err = DeckError::ConfigNotFound {
            path: PathBuf::from("/tmp/missing.toml"),
        };
        assert!(err.to_string().contains("/tmp/missing.toml"));
    }

    #[test]
    fn test_protocol_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DeckError = json_err.into();
        assert!(matches!(err, DeckError::Protocol(_)));
    }
}
