use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Unknown filter condition: {0}")]
    UnknownCondition(String),

    #[error("Film with id {0} not found")]
    NotFound(i64),

    #[error("Row {row}: cannot coerce column '{column}' value {value:?}: {reason}")]
    RowCoercion {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
