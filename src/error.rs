use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read tag index from {path}: {source}")]
    IndexRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse tag index: {0}")]
    IndexParse(String),

    #[error("Tag index not found at {0}")]
    IndexNotFound(PathBuf),

    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("Suggestion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Suggestion service returned {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Suggestion service returned no text")]
    EmptyReply,

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Asset id is not a plain file name: {0}")]
    InvalidAssetId(String),

    #[error("Please describe your idea before submitting.")]
    BlankIdea,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Input ended before a choice was made")]
    NoChoice,
}

pub type Result<T> = std::result::Result<T, MemoryError>;
