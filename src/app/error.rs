use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreshetError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Credentials not configured. Run: freshet setup")]
    MissingCredentials,

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("Scrape error: {0}")]
    Scrape(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FreshetError {
    /// Stable machine-readable code for the CLI's JSON error output.
    pub fn code(&self) -> &'static str {
        match self {
            FreshetError::Auth(_) => "AUTH_FAILED",
            FreshetError::Api { .. } => "API_ERROR",
            FreshetError::NotFound(_) => "NOT_FOUND",
            FreshetError::MissingCredentials => "NO_CREDENTIALS",
            FreshetError::Keychain(_) => "KEYCHAIN_FAILED",
            FreshetError::Scrape(_) => "SCRAPE_FAILED",
            FreshetError::Config(_) => "CONFIG_ERROR",
            FreshetError::InvalidInput(_) => "INVALID_INPUT",
            FreshetError::Io(_) => "IO_ERROR",
            FreshetError::Json(_) => "ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, FreshetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_message_only() {
        let err = FreshetError::Api {
            message: "Failed to get subscriptions: 502".into(),
            status: Some(502),
        };
        assert_eq!(err.to_string(), "Failed to get subscriptions: 502");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            FreshetError::Auth("bad password".into()).code(),
            "AUTH_FAILED"
        );
        assert_eq!(FreshetError::MissingCredentials.code(), "NO_CREDENTIALS");
        assert_eq!(
            FreshetError::Api {
                message: "x".into(),
                status: None
            }
            .code(),
            "API_ERROR"
        );
    }
}
