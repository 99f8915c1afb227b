//! Completeness profiling for observation tables.

use crate::data::ObservationTable;
use serde::{Deserialize, Serialize};

/// Profile of how completely a table's cells are filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessProfile {
    /// Number of rows profiled.
    pub n_rows: usize,
    /// Number of columns profiled.
    pub n_columns: usize,
    /// Total number of cells (rows × columns).
    pub total_cells: usize,
    /// Number of null cells.
    pub null_cells: usize,
    /// Overall completeness (proportion of non-null cells).
    pub completeness: f64,
    /// Completeness per column, aligned with the table's column order.
    pub column_completeness: Vec<f64>,
    /// Completeness per row, aligned with the table's row order.
    pub row_completeness: Vec<f64>,
    /// Mean completeness across rows.
    pub mean_row_completeness: f64,
    /// Median completeness across rows.
    pub median_row_completeness: f64,
}

impl CompletenessProfile {
    /// Check if every cell is filled in.
    pub fn is_complete(&self) -> bool {
        self.null_cells == 0
    }

    /// Positions of columns whose completeness falls below a threshold.
    pub fn sparse_columns(&self, threshold: f64) -> Vec<usize> {
        self.column_completeness
            .iter()
            .enumerate()
            .filter(|(_, &completeness)| completeness < threshold)
            .map(|(pos, _)| pos)
            .collect()
    }
}

impl std::fmt::Display for CompletenessProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Completeness Profile")?;
        writeln!(f, "  Rows:        {}", self.n_rows)?;
        writeln!(f, "  Columns:     {}", self.n_columns)?;
        writeln!(f, "  Total cells: {}", self.total_cells)?;
        writeln!(f, "  Null cells:  {}", self.null_cells)?;
        writeln!(f, "  Overall completeness:    {:.2}%", self.completeness * 100.0)?;
        writeln!(f, "  Mean row completeness:   {:.2}%", self.mean_row_completeness * 100.0)?;
        writeln!(f, "  Median row completeness: {:.2}%", self.median_row_completeness * 100.0)?;
        Ok(())
    }
}

/// Profile how completely an observation table is filled in.
pub fn profile_completeness(table: &ObservationTable) -> CompletenessProfile {
    let n_rows = table.n_rows();
    let n_columns = table.n_columns();
    let total_cells = n_rows * n_columns;

    // Per-column completeness
    let mut column_filled = vec![0usize; n_columns];
    for row in table.rows() {
        for (pos, filled) in column_filled.iter_mut().enumerate() {
            if !row.at(pos).is_null() {
                *filled += 1;
            }
        }
    }
    let column_completeness: Vec<f64> = column_filled
        .iter()
        .map(|&filled| fraction(filled, n_rows))
        .collect();

    // Per-row completeness
    let row_completeness: Vec<f64> = table
        .rows()
        .map(|row| {
            let filled = (0..n_columns).filter(|&pos| !row.at(pos).is_null()).count();
            fraction(filled, n_columns)
        })
        .collect();

    // Statistics
    let filled_cells: usize = column_filled.iter().sum();
    let null_cells = total_cells - filled_cells;
    let completeness = fraction(filled_cells, total_cells);
    let mean_row_completeness = if row_completeness.is_empty() {
        0.0
    } else {
        row_completeness.iter().sum::<f64>() / row_completeness.len() as f64
    };
    let median_row_completeness = median(&row_completeness);

    CompletenessProfile {
        n_rows,
        n_columns,
        total_cells,
        null_cells,
        completeness,
        column_completeness,
        row_completeness,
        mean_row_completeness,
        median_row_completeness,
    }
}

fn fraction(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}
