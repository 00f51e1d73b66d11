use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed fetch error: {0}")]
    SourceFetch(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Summarization error: {0}")]
    Summarization(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("No article stored for {0}")]
    MissingArticle(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
