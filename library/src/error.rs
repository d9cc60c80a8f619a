use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Duplication error: {0}")]
    Duplication(String),
    #[error("Subgraph cycle: asset '{0}' instances itself")]
    SubgraphCycle(String),
    #[error("Subgraph nesting exceeds {0} levels")]
    NestingTooDeep(usize),
    #[error("Object {0} not found")]
    ObjectNotFound(Uuid),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl LibraryError {
    pub fn duplication(msg: impl Into<String>) -> Self {
        LibraryError::Duplication(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        LibraryError::InvalidArgument(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        LibraryError::Validation(msg.into())
    }
}
