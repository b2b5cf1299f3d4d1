use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Repository registration failed for '{repository}': {cause}")]
    RepositoryRegistration {
        repository: String,
        #[source]
        cause: Box<AppError>,
    },

    #[error("Failed to {operation} index '{index}': {reason}")]
    IndexOperation {
        operation: IndexOperation,
        index: String,
        reason: String,
    },

    #[error("Index '{index}' does not exist on this cluster")]
    NotFound { index: String },

    #[error("{operation} was not accepted by the cluster: {reason}")]
    Trigger {
        operation: TriggerOperation,
        reason: String,
    },

    #[error("Cluster answered {status}: {reason}")]
    Cluster { status: u16, reason: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOperation {
    Close,
    Open,
}

impl std::fmt::Display for IndexOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexOperation::Close => f.write_str("close"),
            IndexOperation::Open => f.write_str("open"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOperation {
    Snapshot,
    Restore,
}

impl std::fmt::Display for TriggerOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerOperation::Snapshot => f.write_str("Snapshot"),
            TriggerOperation::Restore => f.write_str("Restore"),
        }
    }
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Configuration(message.into())
    }

    /// True for the "index does not exist" sub-kind, which callers downgrade to a warning.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
