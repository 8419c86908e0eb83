use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphGenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Schema mismatch for type '{type_name}': {detail}")]
    SchemaMismatch { type_name: String, detail: String },

    #[error("Dependency order violated: {0}")]
    DependencyOrder(String),

    #[error("Invalid argument: {0}")]
    InvalidArg(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GraphGenError {
    pub fn schema_mismatch(type_name: impl Into<String>, detail: impl Into<String>) -> Self {
        GraphGenError::SchemaMismatch {
            type_name: type_name.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphGenError>;
