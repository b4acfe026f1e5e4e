use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error("request to {url} failed with status {status}")]
    Transport { url: String, status: reqwest::StatusCode },
    #[error("{0}")]
    Parse(String),
    #[error("directory listing contained no company rows")]
    EmptyDirectory,
    #[error("fetch cancelled before completion")]
    Cancelled,
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }

    pub fn parse<T: Into<String>>(msg: T) -> Self {
        AppError::Parse(msg.into())
    }
}
