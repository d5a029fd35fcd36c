use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or corrupt corpus inputs. The process must not serve traffic.
    #[error("Startup error: {0}")]
    Startup(String),

    #[error("Query analysis error: {0}")]
    QueryAnalysis(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Raised by the retriever for a row past the end of the record table.
    /// Absorbed rather than propagated.
    #[error("Index row {row} out of range for {len} records")]
    RowOutOfRange { row: usize, len: usize },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether repeating the call that produced this error could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::QueryAnalysis(_) | Error::Embedding(_) | Error::Io(_)
        )
    }
}
