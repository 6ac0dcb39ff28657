//! Output sink trait and errors
//!
//! This module defines the trait interface for record sinks.

use crate::record::WorkRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for record sinks
///
/// The coordinator calls `write_header` once, then `write_record` once per
/// work in completion order, then `finish`. Calls are never concurrent.
pub trait RecordSink: Send {
    /// Writes the header row
    fn write_header(&mut self) -> OutputResult<()>;

    /// Writes one work as a row
    ///
    /// Implementations should make the row visible immediately so that a
    /// failed run still leaves every finished record behind.
    fn write_record(&mut self, record: &WorkRecord) -> OutputResult<()>;

    /// Flushes any buffered output
    fn finish(&mut self) -> OutputResult<()>;
}
