use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request to Bitbucket failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bitbucket API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected Bitbucket response: {0}")]
    Decode(String),
}
