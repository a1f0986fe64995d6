use thiserror::Error;

/// Input rejected before anything is sent. The player can fix it and try again.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name required")]
    NameRequired,
    #[error("name too long")]
    NameTooLong,
    #[error("invalid time")]
    InvalidTime,
    #[error("too many submissions")]
    TooManySubmissions,
}

#[derive(Error, Debug)]
pub enum LeaderboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("score already submitted for this game")]
    AlreadySubmitted,
    #[error("endpoint unreachable: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid endpoint url {0}")]
    InvalidEndpoint(String),
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

impl From<reqwest::Error> for LeaderboardError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

impl LeaderboardError {
    /// Whether the player can correct their input and retry right away.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = core::result::Result<T, LeaderboardError>;
