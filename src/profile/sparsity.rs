//! Sparsity profiling for abundance tables.

use crate::data::AbundanceTable;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};

/// Profile of sparsity characteristics in an abundance table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparsityProfile {
    /// Total number of entries (samples × taxa).
    pub total_entries: usize,
    /// Number of non-zero entries.
    pub nonzero_entries: usize,
    /// Number of zero entries.
    pub zero_entries: usize,
    /// Overall sparsity (proportion of zeros).
    pub sparsity: f64,
    /// Sparsity per taxon (column).
    pub taxon_sparsity: Vec<f64>,
    /// Sparsity per sample (row).
    pub sample_sparsity: Vec<f64>,
    /// Mean sparsity across taxa.
    pub mean_taxon_sparsity: f64,
    /// Mean sparsity across samples.
    pub mean_sample_sparsity: f64,
    /// Median sparsity across taxa.
    pub median_taxon_sparsity: f64,
    /// Median sparsity across samples.
    pub median_sample_sparsity: f64,
}

impl SparsityProfile {
    /// Check if the data is highly sparse (> 50% zeros).
    pub fn is_highly_sparse(&self) -> bool {
        self.sparsity > 0.5
    }
}

impl std::fmt::Display for SparsityProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Sparsity Profile")?;
        writeln!(f, "  Total entries:     {}", self.total_entries)?;
        writeln!(f, "  Non-zero entries:  {}", self.nonzero_entries)?;
        writeln!(f, "  Zero entries:      {}", self.zero_entries)?;
        writeln!(f, "  Overall sparsity:  {:.2}%", self.sparsity * 100.0)?;
        writeln!(f, "  Mean taxon sparsity:    {:.2}%", self.mean_taxon_sparsity * 100.0)?;
        writeln!(f, "  Median taxon sparsity:  {:.2}%", self.median_taxon_sparsity * 100.0)?;
        writeln!(f, "  Mean sample sparsity:   {:.2}%", self.mean_sample_sparsity * 100.0)?;
        writeln!(f, "  Median sample sparsity: {:.2}%", self.median_sample_sparsity * 100.0)?;
        Ok(())
    }
}

/// Profile sparsity characteristics of an abundance table.
pub fn profile_sparsity(table: &AbundanceTable) -> SparsityProfile {
    let n_samples = table.n_samples();
    let n_taxa = table.n_taxa();
    let total_entries = n_samples * n_taxa;
    let nonzero_entries = table.data().iter().filter(|&&v| v != 0.0).count();
    let zero_entries = total_entries - nonzero_entries;

    let taxon_sparsity: Vec<f64> = table
        .data()
        .column_iter()
        .map(|col| fraction_zero(col.iter().copied(), n_samples))
        .collect();
    let sample_sparsity: Vec<f64> = table
        .data()
        .row_iter()
        .map(|row| fraction_zero(row.iter().copied(), n_taxa))
        .collect();

    SparsityProfile {
        total_entries,
        nonzero_entries,
        zero_entries,
        sparsity: ratio(zero_entries, total_entries),
        mean_taxon_sparsity: mean(&taxon_sparsity),
        mean_sample_sparsity: mean(&sample_sparsity),
        median_taxon_sparsity: median(&taxon_sparsity),
        median_sample_sparsity: median(&sample_sparsity),
        taxon_sparsity,
        sample_sparsity,
    }
}

fn fraction_zero(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    ratio(values.filter(|&v| v == 0.0).count(), n)
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().mean()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Data::new(values.to_vec()).median()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn create_test_table() -> AbundanceTable {
        // 4 samples × 3 taxa, some zeros
        let data = DMatrix::from_row_slice(
            4,
            3,
            &[
                10.0, 100.0, 1.0, //
                20.0, 200.0, 0.0, //
                0.0, 150.0, 0.0, //
                5.0, 175.0, 0.0,
            ],
        );
        let sample_ids = vec!["S1".into(), "S2".into(), "S3".into(), "S4".into()];
        let taxon_ids = vec!["A".into(), "B".into(), "C".into()];
        AbundanceTable::new(data, sample_ids, taxon_ids).unwrap()
    }

    #[test]
    fn test_profile_sparsity() {
        let profile = profile_sparsity(&create_test_table());

        assert_eq!(profile.total_entries, 12);
        assert_eq!(profile.nonzero_entries, 8);
        assert_eq!(profile.zero_entries, 4);
        assert!((profile.sparsity - 4.0 / 12.0).abs() < 1e-10);
        assert!(!profile.is_highly_sparse());
    }

    #[test]
    fn test_taxon_sparsity() {
        let profile = profile_sparsity(&create_test_table());

        // Taxon A: 1 zero of 4 → 25% sparse
        assert!((profile.taxon_sparsity[0] - 0.25).abs() < 1e-10);
        assert!((profile.taxon_sparsity[1] - 0.0).abs() < 1e-10);
        assert!((profile.taxon_sparsity[2] - 0.75).abs() < 1e-10);
        assert!((profile.median_taxon_sparsity - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_summary_statistics() {
        let profile = profile_sparsity(&create_test_table());

        assert_relative_eq!(profile.mean_taxon_sparsity, 1.0 / 3.0, epsilon = 1e-12);
        // Samples: 0, 1/3, 2/3, 1/3
        assert_relative_eq!(profile.mean_sample_sparsity, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(profile.median_sample_sparsity, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_table() {
        let table = AbundanceTable::new(DMatrix::zeros(0, 0), vec![], vec![]).unwrap();
        let profile = profile_sparsity(&table);
        assert_eq!(profile.total_entries, 0);
        assert_eq!(profile.sparsity, 0.0);
        assert_eq!(profile.mean_taxon_sparsity, 0.0);
        assert_eq!(profile.median_sample_sparsity, 0.0);
    }
}
