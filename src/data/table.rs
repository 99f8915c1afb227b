//! Ordered observation table addressed by column name.

use crate::data::Value;
use crate::error::{Result, ScrubError};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// An ordered table of observation records.
///
/// Rows keep their original order, and every row carries the index label it
/// was assigned at construction. Filtering subsets rows and labels together
/// and never renumbers, so a surviving row is identifiable across any chain
/// of filters.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    /// Ordered column names.
    columns: Vec<String>,
    /// Per-row index labels, parallel to `rows`.
    index: Vec<u64>,
    /// Row-major cell storage.
    rows: Vec<Vec<Value>>,
}

/// Borrowed view of a single row, for use in row predicates.
#[derive(Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a ObservationTable,
    row: usize,
}

impl<'a> RowRef<'a> {
    /// The row's index label.
    #[inline]
    pub fn index(&self) -> u64 {
        self.table.index[self.row]
    }

    /// Look up a cell by column name.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let pos = self.table.columns.iter().position(|c| c == column)?;
        Some(&self.table.rows[self.row][pos])
    }

    /// Cell at a column position previously resolved with
    /// [`ObservationTable::column_position`].
    #[inline]
    pub fn at(&self, position: usize) -> &'a Value {
        &self.table.rows[self.row][position]
    }
}

impl ObservationTable {
    /// Create an empty table with the given column names.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(ScrubError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            columns,
            index: Vec::new(),
            rows: Vec::new(),
        })
    }

    /// Create a table from column names and row data.
    ///
    /// Rows are labeled 0..n in order.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut table = Self::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append a row, assigning it the next index label.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ScrubError::DimensionMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        let label = self.index.last().map_or(0, |last| last + 1);
        self.index.push(label);
        self.rows.push(row);
        Ok(())
    }

    /// Load a table from a CSV file with a header row.
    ///
    /// Cells are parsed with [`Value::parse`] and rows are labeled 0..n.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));

        let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let mut table = Self::new(columns)?;

        for record in reader.records() {
            let record = record?;
            let row: Vec<Value> = record.iter().map(Value::parse).collect();
            table.push_row(row)?;
        }

        Ok(table)
    }

    /// Write the table to a CSV file. Nulls become empty fields.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(BufWriter::new(file));

        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ordered column names.
    #[inline]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Per-row index labels, parallel to row order.
    #[inline]
    pub fn index(&self) -> &[u64] {
        &self.index
    }

    /// Resolve a column name to its position.
    pub fn column_position(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ScrubError::MissingColumn(name.to_string()))
    }

    /// Borrowed view of the row at `row`.
    #[inline]
    pub fn row(&self, row: usize) -> RowRef<'_> {
        RowRef { table: self, row }
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        (0..self.rows.len()).map(move |row| RowRef { table: self, row })
    }

    /// All values of a named column, in row order.
    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>> {
        let pos = self.column_position(name)?;
        Ok(self.rows.iter().map(|row| &row[pos]).collect())
    }

    fn subset_by_mask(&self, keep: &[bool]) -> Self {
        let mut index = Vec::new();
        let mut rows = Vec::new();
        for (i, &k) in keep.iter().enumerate() {
            if k {
                index.push(self.index[i]);
                rows.push(self.rows[i].clone());
            }
        }
        Self {
            columns: self.columns.clone(),
            index,
            rows,
        }
    }

    fn retain_by_mask(&mut self, keep: &[bool]) {
        let mut i = 0;
        self.rows.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
        let mut i = 0;
        self.index.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
    }

    /// Copy the rows marked `true` into a new table, preserving order and
    /// index labels.
    pub fn select_mask(&self, keep: &[bool]) -> Result<Self> {
        if keep.len() != self.rows.len() {
            return Err(ScrubError::DimensionMismatch {
                expected: self.rows.len(),
                actual: keep.len(),
            });
        }
        Ok(self.subset_by_mask(keep))
    }

    /// Drop the rows marked `false` in place, preserving order and index
    /// labels of the survivors.
    pub fn retain_mask(&mut self, keep: &[bool]) -> Result<()> {
        if keep.len() != self.rows.len() {
            return Err(ScrubError::DimensionMismatch {
                expected: self.rows.len(),
                actual: keep.len(),
            });
        }
        self.retain_by_mask(keep);
        Ok(())
    }

    /// Copy the rows satisfying a pure predicate into a new table.
    pub fn select_rows<P>(&self, predicate: P) -> Self
    where
        P: Fn(RowRef<'_>) -> bool,
    {
        let keep: Vec<bool> = (0..self.rows.len())
            .map(|row| predicate(self.row(row)))
            .collect();
        self.subset_by_mask(&keep)
    }

    /// Drop the rows failing a predicate in place.
    pub fn retain_rows<P>(&mut self, mut predicate: P)
    where
        P: FnMut(RowRef<'_>) -> bool,
    {
        let keep: Vec<bool> = (0..self.rows.len())
            .map(|row| predicate(self.row(row)))
            .collect();
        self.retain_by_mask(&keep);
    }

    /// Rename a column, keeping its position and data.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        let pos = self.column_position(from)?;
        if from != to && self.columns.iter().any(|c| c == to) {
            return Err(ScrubError::DuplicateColumn(to.to_string()));
        }
        self.columns[pos] = to.to_string();
        Ok(())
    }

    /// Replace all column names at once.
    pub fn set_column_names(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.columns.len() {
            return Err(ScrubError::DimensionMismatch {
                expected: self.columns.len(),
                actual: names.len(),
            });
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ScrubError::DuplicateColumn(name.clone()));
            }
        }
        self.columns = names;
        Ok(())
    }

    /// Append a column with one value per existing row.
    pub fn add_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if self.columns.iter().any(|c| c == name) {
            return Err(ScrubError::DuplicateColumn(name.to_string()));
        }
        if values.len() != self.rows.len() {
            return Err(ScrubError::DimensionMismatch {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Replace every value of an existing column.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        let pos = self.column_position(name)?;
        if values.len() != self.rows.len() {
            return Err(ScrubError::DimensionMismatch {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[pos] = value;
        }
        Ok(())
    }

    /// Remove a column and its data.
    pub fn drop_column(&mut self, name: &str) -> Result<()> {
        let pos = self.column_position(name)?;
        self.columns.remove(pos);
        for row in &mut self.rows {
            row.remove(pos);
        }
        Ok(())
    }
}
