//! Error types shared across the build pipeline and the comment flow

use thiserror::Error;

/// Failure talking to the content store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("content store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("content store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected content store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("content store misconfigured: {0}")]
    Config(String),
}

/// Failure forwarding a comment to the moderation endpoint
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("comment submission failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("moderation endpoint rejected the comment ({status})")]
    Rejected { status: u16 },
}

/// Failure producing a page artifact
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("template rendering failed: {0}")]
    Render(#[from] tera::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("build task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
