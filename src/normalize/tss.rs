//! Total Sum Scaling (TSS) of sample rows.
//!
//! TSS converts abundances to relative abundances by dividing each value by
//! the total abundance of its sample. A sample with zero total stays all-zero
//! rather than turning into NaN.

use crate::data::AbundanceTable;
use crate::error::{Result, VirError};
use nalgebra::DMatrix;
use rayon::prelude::*;

/// Apply Total Sum Scaling to every sample (row).
///
/// # Formula
/// For sample i: TSS(x_ij) = x_ij / sum(x_i) * scale_factor
///
/// # Arguments
/// * `table` - Abundance table
/// * `scale_factor` - Multiplier for normalized values (1.0 for proportions,
///   100.0 for percentages, 1e6 for per-million)
///
/// # Example
/// ```ignore
/// let proportions = norm_tss(&table, scale::PROPORTION)?;
/// ```
pub fn norm_tss(table: &AbundanceTable, scale_factor: f64) -> Result<AbundanceTable> {
    if !(scale_factor > 0.0 && scale_factor.is_finite()) {
        return Err(VirError::InvalidParameter(
            "Scale factor must be positive".to_string(),
        ));
    }

    let n_samples = table.n_samples();
    let n_taxa = table.n_taxa();
    let row_sums = table.row_sums();

    let normalized_rows: Vec<Vec<f64>> = (0..n_samples)
        .into_par_iter()
        .map(|i| {
            let total = row_sums[i];
            if total == 0.0 {
                return vec![0.0; n_taxa];
            }
            (0..n_taxa)
                .map(|j| table.get(i, j) / total * scale_factor)
                .collect()
        })
        .collect();

    let data = DMatrix::from_fn(n_samples, n_taxa, |i, j| normalized_rows[i][j]);

    AbundanceTable::new(
        data,
        table.sample_ids().to_vec(),
        table.taxon_ids().to_vec(),
    )
}

/// Common scale factors for TSS normalization.
pub mod scale {
    /// Proportions (sum to 1.0 per sample).
    pub const PROPORTION: f64 = 1.0;
    /// Percentages.
    pub const PERCENT: f64 = 100.0;
    /// Per million.
    pub const PER_MILLION: f64 = 1_000_000.0;
}
