use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("tour is not a permutation of 0..{expected}: {reason}")]
    InvalidTour { expected: usize, reason: String },
    #[error("no free directory name for '{base}' after {attempts} attempts")]
    OutputDirExhausted { base: String, attempts: usize },
    #[error("render failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn invalid_tour(expected: usize, reason: impl Into<String>) -> Self {
        Self::InvalidTour {
            expected,
            reason: reason.into(),
        }
    }
}
