//! CSV record sink
//!
//! Rows follow the unix CSV dialect: every field is double-quoted, embedded
//! quotes are doubled, and rows end with `\n`.

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::WorkRecord;
use std::io::{self, Write};

/// Write a single CSV row with every field quoted.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, "{}", sep)?;
        } else {
            first = false;
        }
        write!(w, "\"{}\"", cell.as_ref().replace('"', "\"\""))?;
    }
    writeln!(w)
}

/// Streams work records as CSV rows to any writer
pub struct CsvSink<W: Write> {
    writer: W,
    rows: usize,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, rows: 0 }
    }

    /// Number of data rows written (header excluded)
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> RecordSink for CsvSink<W> {
    fn write_header(&mut self) -> OutputResult<()> {
        write_row(&mut self.writer, &WorkRecord::HEADER, ',')?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_record(&mut self, record: &WorkRecord) -> OutputResult<()> {
        write_row(&mut self.writer, &record.fields(), ',')?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
