//! Shared row-count statistics for filters.

use serde::{Deserialize, Serialize};

/// Result of a row filter with statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterStats {
    /// Number of rows before filtering.
    pub n_before: usize,
    /// Number of rows after filtering.
    pub n_after: usize,
    /// Number of rows removed.
    pub n_removed: usize,
    /// Proportion of rows retained.
    pub retention_rate: f64,
}

impl FilterStats {
    /// Build stats from before/after row counts. An empty input counts as
    /// full retention.
    pub fn new(n_before: usize, n_after: usize) -> Self {
        let retention_rate = if n_before == 0 {
            1.0
        } else {
            n_after as f64 / n_before as f64
        };
        Self {
            n_before,
            n_after,
            n_removed: n_before - n_after,
            retention_rate,
        }
    }
}

impl std::fmt::Display for FilterStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Filter Result")?;
        writeln!(f, "  Before:    {} rows", self.n_before)?;
        writeln!(f, "  After:     {} rows", self.n_after)?;
        writeln!(f, "  Removed:   {} rows", self.n_removed)?;
        writeln!(f, "  Retained:  {:.1}%", self.retention_rate * 100.0)?;
        Ok(())
    }
}
