use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("[{code}] {kind}: {message}")]
    Provider {
        code: i64,
        kind: String,
        message: String,
    },

    #[error("[401] Unauthorized: Invalid Token")]
    UnauthorizedToken,

    #[error("[{code}] timed out: {message}")]
    Timeout { code: i64, message: String },

    #[error("Interaction failed: {0}")]
    Interaction(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Transport(err.to_string())
    }
}

impl From<dialoguer::Error> for AuthError {
    fn from(err: dialoguer::Error) -> Self {
        AuthError::Interaction(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
