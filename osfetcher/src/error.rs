use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetcherError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("no '{0}' endpoint in the service catalog")]
    MissingEndpoint(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("OpenStack API error: {0}")]
    Api(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("graph generation error: {0}")]
    Graph(#[from] nebulagen::errors::GraphGenError),
}

pub type Result<T> = std::result::Result<T, FetcherError>;
