//! # vald-sink
//!
//! Destinations for extraction tables.
//!
//! - [`CsvSink`]: one UTF-8 CSV file per table in a fixed directory, header
//!   row first, overwritten on every run.
//! - [`SheetsSink`]: one sheet per table in a shared spreadsheet, cleared and
//!   rewritten in full on every run. Every cell is uploaded as text.

mod csv_file;
mod error;
mod sheets;

pub use csv_file::CsvSink;
pub use error::SinkError;
pub use sheets::{CREATE_MAX_COLUMNS, CREATE_MAX_ROWS, MAX_UPLOAD_ROWS, SheetWrite, SheetsSink};
