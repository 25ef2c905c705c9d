use thiserror::Error;

/// Main error type for wof-graph
#[derive(Error, Debug)]
pub enum GraphError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record bytes could not be turned into a record
    #[error("Unable to load {path}, because {reason}")]
    Decode { path: String, reason: String },

    /// A related record could not be retrieved from any store
    #[error("Failed to load record for {id}, {reason}")]
    Fetch { id: i64, reason: String },

    /// Identifier cannot be mapped to a path
    #[error("Invalid record ID: {0}")]
    InvalidId(i64),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Corpus walk errors (walker internals, not per-record failures)
    #[error("Walk error: {0}")]
    Walk(String),
}

/// Convenient Result type using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;
