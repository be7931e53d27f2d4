use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] ::duckdb::Error),

    #[error(transparent)]
    Schema(#[from] revrate_core::SchemaError),

    #[error("store schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("unknown attribute column: {0}")]
    UnknownAttribute(String),

    #[error("unknown comment: {0}")]
    UnknownComment(String),
}
