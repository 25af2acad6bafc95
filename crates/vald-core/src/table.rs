//! Column-ordered tabular record set.
//!
//! A [`Table`] is the unit every component exchanges: fetchers produce them,
//! the extractor accumulates them, the consolidator joins them, and sinks
//! write them. Columns are the ordered union of every record's keys in order
//! of first appearance. Rows missing a column hold [`Cell::Null`].

use serde_json::{Map, Value};

use crate::cell::Cell;
use crate::errors::CoreError;

/// A raw vendor record, as decoded from JSON.
pub type Record = Map<String, Value>;

/// Separator used when flattening nested objects into column names.
pub const NESTED_SEPARATOR: &str = ".";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Borrowed view over one row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    /// Cell under `column`, or `None` if the table has no such column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.cells.get(i))
    }

    /// Text rendering of the cell under `column`; `None` for missing or null.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column)
            .filter(|c| !c.is_null())
            .map(Cell::to_text)
    }

    #[must_use]
    pub const fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}

impl Table {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Build a table from vendor records, flattening nested objects.
    #[must_use]
    pub fn from_records<'r>(records: impl IntoIterator<Item = &'r Record>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.push_record(record);
        }
        table
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Append one vendor record. Nested objects become `parent.child` columns.
    pub fn push_record(&mut self, record: &Record) {
        let mut pairs = Vec::with_capacity(record.len());
        flatten_into("", record, &mut pairs);
        self.push_pairs(pairs);
    }

    /// Append one row given as `(column, cell)` pairs. Unknown columns are
    /// added at the end.
    pub fn push_pairs(&mut self, pairs: Vec<(String, Cell)>) {
        let mut row = vec![Cell::Null; self.columns.len()];
        for (column, cell) in pairs {
            let idx = self.ensure_column(&column);
            if idx >= row.len() {
                row.resize(idx + 1, Cell::Null);
            }
            row[idx] = cell;
        }
        self.rows.push(row);
    }

    /// Append every row of `other`, unioning columns.
    pub fn append(&mut self, other: Self) {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return;
        }
        let mapping: Vec<usize> = other
            .columns
            .iter()
            .map(|c| self.ensure_column(c))
            .collect();
        let width = self.columns.len();
        for source in other.rows {
            let mut row = vec![Cell::Null; width];
            for (cell, &idx) in source.into_iter().zip(&mapping) {
                row[idx] = cell;
            }
            self.rows.push(row);
        }
    }

    /// Set `column` to `value` on every row, adding the column if needed.
    pub fn set_constant(&mut self, column: &str, value: &Cell) {
        let idx = self.ensure_column(column);
        for row in &mut self.rows {
            row[idx] = value.clone();
        }
    }

    /// Add (or replace) a column computed from each row.
    pub fn derive_column(&mut self, column: &str, f: impl Fn(Row<'_>) -> Cell) {
        let values: Vec<Cell> = self.rows().map(f).collect();
        let idx = self.ensure_column(column);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
    }

    /// Transform every cell of an existing column in place.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingColumn`] if the column does not exist.
    pub fn map_column(&mut self, column: &str, f: impl Fn(Cell) -> Cell) -> Result<(), CoreError> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| CoreError::MissingColumn(column.to_string()))?;
        for row in &mut self.rows {
            let cell = std::mem::take(&mut row[idx]);
            row[idx] = f(cell);
        }
        Ok(())
    }

    /// Transform every cell of the table in place.
    pub fn map_cells(&mut self, f: impl Fn(Cell) -> Cell) {
        for cell in self.rows.iter_mut().flatten() {
            *cell = f(std::mem::take(cell));
        }
    }

    /// Keep only rows for which `predicate` holds.
    pub fn retain(&mut self, predicate: impl Fn(Row<'_>) -> bool) {
        let columns = &self.columns;
        self.rows.retain(|cells| predicate(Row { columns, cells }));
    }

    /// Header row followed by every row rendered as text.
    #[must_use]
    pub fn to_text_grid(&self) -> Vec<Vec<String>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.columns.clone());
        grid.extend(
            self.rows
                .iter()
                .map(|row| row.iter().map(Cell::to_text).collect()),
        );
        grid
    }

    fn ensure_column(&mut self, column: &str) -> usize {
        if let Some(idx) = self.column_index(column) {
            return idx;
        }
        self.columns.push(column.to_string());
        for row in &mut self.rows {
            row.push(Cell::Null);
        }
        self.columns.len() - 1
    }
}

fn flatten_into(prefix: &str, object: &Record, out: &mut Vec<(String, Cell)>) {
    for (key, value) in object {
        let column = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}{NESTED_SEPARATOR}{key}")
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(&column, inner, out),
            other => out.push((column, Cell::from_json(other))),
        }
    }
}
