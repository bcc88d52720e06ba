//! Courtside error types

/// Courtside error types
///
/// `Clone` so that a single failed fetch can be handed to every caller
/// waiting on the same in-flight request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CourtsideError {
    // Remote store errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("store error ({status}): {message}")]
    Store { status: u16, message: String },

    // Domain errors
    #[error("player {0} not found")]
    PlayerNotFound(i64),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Data processing errors
    #[error("data error: {0}")]
    DataError(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CourtsideError {
    /// Whether the error originated in the remote store or the transport to it.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Store { .. })
    }
}

impl From<serde_json::Error> for CourtsideError {
    fn from(err: serde_json::Error) -> Self {
        CourtsideError::DataError(err.to_string())
    }
}

/// Result type alias for Courtside operations
pub type Result<T> = std::result::Result<T, CourtsideError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_classification() {
        assert!(CourtsideError::Http("reset".into()).is_remote());
        assert!(
            CourtsideError::Store {
                status: 500,
                message: "boom".into()
            }
            .is_remote()
        );
        assert!(!CourtsideError::PlayerNotFound(7).is_remote());
        assert!(!CourtsideError::InvalidInput("id".into()).is_remote());
    }

    #[test]
    fn json_error_becomes_data_error() {
        let err: CourtsideError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, CourtsideError::DataError(_)));
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            CourtsideError::PlayerNotFound(2544).to_string(),
            "player 2544 not found"
        );
        assert_eq!(
            CourtsideError::Store {
                status: 400,
                message: "column does not exist".into()
            }
            .to_string(),
            "store error (400): column does not exist"
        );
    }
}
