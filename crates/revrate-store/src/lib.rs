//! Storage layer: DuckDB (long format) and Arrow columnar (wide format) sinks.

mod error;
pub use error::StoreError;

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckSink;

mod columnar;
pub use columnar::ColumnarSink;
