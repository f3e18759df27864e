//! Unified data-layer error type.
//! Loader errors are fatal (the table either fully loads or not at all);
//! query errors are scoped to the single query that raised them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    /// The input file is missing or unreadable.
    #[error("cannot read dataset source '{}': {source}", .path.display())]
    SourceNotFound { path: PathBuf, source: io::Error },

    /// A required column is absent, or a cell does not fit the booking schema.
    #[error("schema mismatch: {0}")]
    Schema(String),

    /// A mean or ratio was requested over a group with no rows in it.
    #[error("query '{query}' has no rows in group '{group}'")]
    EmptyGroup { query: &'static str, group: String },

    /// The loader does not recognise the file extension.
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

pub type DataResult<T> = Result<T, DataError>;
