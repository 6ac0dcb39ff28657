//! Output module for streaming crawl results
//!
//! This module handles:
//! - Writing work records as CSV rows as soon as they are finished
//! - Reporting completed pages out of total

mod csv;
mod progress;
mod traits;

pub use self::csv::{write_row, CsvSink};
pub use progress::CrawlProgress;
pub use traits::{OutputError, OutputResult, RecordSink};
