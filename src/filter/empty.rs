//! Removal of samples with no abundance at all.

use crate::data::AbundanceTable;
use crate::error::{Result, VirError};
use log::info;
use serde::{Deserialize, Serialize};

/// Result of empty-sample filtering with statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmptySampleFilterResult {
    /// Number of samples before filtering.
    pub n_before: usize,
    /// Number of samples after filtering.
    pub n_after: usize,
    /// Number of samples removed.
    pub n_removed: usize,
    /// IDs of removed samples.
    pub removed_samples: Vec<String>,
}

impl std::fmt::Display for EmptySampleFilterResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Empty Sample Filter Result")?;
        writeln!(f, "  Samples before:  {}", self.n_before)?;
        writeln!(f, "  Samples after:   {}", self.n_after)?;
        writeln!(f, "  Samples removed: {}", self.n_removed)?;
        if !self.removed_samples.is_empty() {
            writeln!(f, "  Removed: {:?}", self.removed_samples)?;
        }
        Ok(())
    }
}

/// Drop samples whose row sum is exactly zero.
///
/// # Errors
/// Fails with `EmptyData` if no sample is left.
pub fn drop_empty_samples(
    table: &AbundanceTable,
) -> Result<(AbundanceTable, EmptySampleFilterResult)> {
    let n_before = table.n_samples();
    let row_sums = table.row_sums();

    let keep_indices: Vec<usize> = row_sums
        .iter()
        .enumerate()
        .filter(|(_, &sum)| sum != 0.0)
        .map(|(i, _)| i)
        .collect();

    let removed_samples: Vec<String> = row_sums
        .iter()
        .zip(table.sample_ids())
        .filter(|(&sum, _)| sum == 0.0)
        .map(|(_, id)| id.clone())
        .collect();

    if keep_indices.is_empty() {
        return Err(VirError::EmptyData(format!(
            "all {} samples have zero total abundance",
            n_before
        )));
    }

    let filtered = table.subset_samples(&keep_indices)?;
    let n_after = filtered.n_samples();
    info!("Empty samples removed: {}", n_before - n_after);

    let result = EmptySampleFilterResult {
        n_before,
        n_after,
        n_removed: n_before - n_after,
        removed_samples,
    };

    Ok((filtered, result))
}
