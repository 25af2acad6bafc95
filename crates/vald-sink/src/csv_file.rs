//! Local CSV output.

use std::path::{Path, PathBuf};

use vald_core::{Cell, Table};

use crate::error::SinkError;

/// Writes tables as `<dir>/<name>.csv`.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `table` to `<dir>/<name>.csv`, replacing any existing file.
    ///
    /// The output directory is created on first use. A table without
    /// columns produces an empty file.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the directory cannot be created, or
    /// [`SinkError::Csv`] if the file cannot be written.
    pub fn write_table(&self, name: &str, table: &Table) -> Result<PathBuf, SinkError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SinkError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(format!("{name}.csv"));

        let mut writer = csv::Writer::from_path(&path)?;
        if !table.columns().is_empty() {
            writer.write_record(table.columns())?;
            for row in table.rows() {
                writer.write_record(row.cells().iter().map(Cell::to_text))?;
            }
        }
        writer.flush().map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), rows = table.len(), "wrote csv");
        Ok(path)
    }
}
