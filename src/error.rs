use thiserror::Error;

/// Errors from the TMDB client.
///
/// Kept `Clone` so results can travel inside iced messages.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("TMDB API Error: {reason}")]
    Status { code: u16, reason: String },

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}
