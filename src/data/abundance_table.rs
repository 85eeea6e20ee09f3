//! Dense abundance table for per-sample taxon abundances.

use crate::data::SampleRecord;
use crate::error::{Result, VirError};
use nalgebra::DMatrix;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A dense table of taxon abundances across samples.
///
/// Rows represent samples, columns represent taxa. Sample labels are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceTable {
    /// Dense matrix (samples × taxa)
    data: DMatrix<f64>,
    /// Sample identifiers (row names)
    sample_ids: Vec<String>,
    /// Taxon labels (column names)
    taxon_ids: Vec<String>,
}

impl AbundanceTable {
    /// Create a new AbundanceTable from a dense matrix and identifiers.
    pub fn new(data: DMatrix<f64>, sample_ids: Vec<String>, taxon_ids: Vec<String>) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != sample_ids.len() {
            return Err(VirError::DimensionMismatch {
                expected: nrows,
                actual: sample_ids.len(),
            });
        }
        if ncols != taxon_ids.len() {
            return Err(VirError::DimensionMismatch {
                expected: ncols,
                actual: taxon_ids.len(),
            });
        }
        let mut seen = HashSet::with_capacity(sample_ids.len());
        for id in &sample_ids {
            if !seen.insert(id.as_str()) {
                return Err(VirError::DuplicateSample(id.clone()));
            }
        }
        Ok(Self {
            data,
            sample_ids,
            taxon_ids,
        })
    }

    /// Align sample records into a table.
    ///
    /// The column set is the union of all taxa in encounter order: first the
    /// keys of the first record, then any new keys of the second, and so on.
    /// Taxa missing from a record are zero. Rows keep the record order.
    pub fn from_records(records: &[SampleRecord]) -> Result<Self> {
        let mut taxon_ids: Vec<String> = Vec::new();
        let mut taxon_index: HashMap<&str, usize> = HashMap::new();
        for record in records {
            for (taxon, _) in record.abundances() {
                if !taxon_index.contains_key(taxon.as_str()) {
                    taxon_index.insert(taxon.as_str(), taxon_ids.len());
                    taxon_ids.push(taxon.clone());
                }
            }
        }

        let mut data = DMatrix::zeros(records.len(), taxon_ids.len());
        for (row, record) in records.iter().enumerate() {
            for (taxon, value) in record.abundances() {
                let col = taxon_index[taxon.as_str()];
                // A taxon repeated within one record keeps its last value.
                data[(row, col)] = *value;
            }
        }

        let sample_ids = records.iter().map(|r| r.sample_id().to_string()).collect();
        Self::new(data, sample_ids, taxon_ids)
    }

    /// Get the value at (sample, taxon).
    #[inline]
    pub fn get(&self, sample: usize, taxon: usize) -> f64 {
        self.data[(sample, taxon)]
    }

    /// Look up a value by sample and taxon label.
    pub fn get_by_label(&self, sample_id: &str, taxon_id: &str) -> Option<f64> {
        let row = self.sample_index(sample_id)?;
        let col = self.taxon_index(taxon_id)?;
        Some(self.get(row, col))
    }

    /// Number of samples (rows).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    /// Number of taxa (columns).
    #[inline]
    pub fn n_taxa(&self) -> usize {
        self.data.ncols()
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Taxon labels.
    #[inline]
    pub fn taxon_ids(&self) -> &[String] {
        &self.taxon_ids
    }

    /// Get the underlying dense matrix.
    #[inline]
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Index of the first row with this label.
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|id| id == sample_id)
    }

    /// Index of the first column with this label.
    pub fn taxon_index(&self, taxon_id: &str) -> Option<usize> {
        self.taxon_ids.iter().position(|id| id == taxon_id)
    }

    /// Whether a column with this label exists.
    pub fn contains_taxon(&self, taxon_id: &str) -> bool {
        self.taxon_index(taxon_id).is_some()
    }

    /// Get a row (sample) as a vector.
    pub fn row(&self, sample: usize) -> Vec<f64> {
        self.data.row(sample).iter().copied().collect()
    }

    /// Get a column (taxon) as a vector.
    pub fn column(&self, taxon: usize) -> Vec<f64> {
        self.data.column(taxon).iter().copied().collect()
    }

    /// Compute row sums (total abundance per sample).
    pub fn row_sums(&self) -> Vec<f64> {
        self.data.row_iter().map(|row| row.sum()).collect()
    }

    /// Compute column sums (total abundance per taxon).
    pub fn col_sums(&self) -> Vec<f64> {
        self.data.column_iter().map(|col| col.sum()).collect()
    }

    /// Add the values of column `from` into column `into`.
    pub(crate) fn add_column_into(&mut self, from: usize, into: usize) {
        if from == into {
            let doubled = self.data.column(from) * 2.0;
            self.data.set_column(into, &doubled);
            return;
        }
        let source = self.data.column(from).clone_owned();
        let mut target = self.data.column_mut(into);
        target += source;
    }

    /// Subset the table to the given rows (by index), in the given order.
    pub fn subset_samples(&self, indices: &[usize]) -> Result<Self> {
        for &idx in indices {
            if idx >= self.n_samples() {
                return Err(VirError::InvalidParameter(format!(
                    "Sample index {} out of bounds",
                    idx
                )));
            }
        }
        let data = self.data.select_rows(indices);
        let sample_ids = indices.iter().map(|&i| self.sample_ids[i].clone()).collect();
        Self::new(data, sample_ids, self.taxon_ids.clone())
    }

    /// Subset the table to the given columns (by index), in the given order.
    pub fn subset_taxa(&self, indices: &[usize]) -> Result<Self> {
        for &idx in indices {
            if idx >= self.n_taxa() {
                return Err(VirError::InvalidParameter(format!(
                    "Taxon index {} out of bounds",
                    idx
                )));
            }
        }
        let data = self.data.select_columns(indices);
        let taxon_ids = indices.iter().map(|&i| self.taxon_ids[i].clone()).collect();
        Self::new(data, self.sample_ids.clone(), taxon_ids)
    }

    /// Replace the column labels. Duplicate labels are allowed.
    pub fn with_taxon_ids(self, taxon_ids: Vec<String>) -> Result<Self> {
        Self::new(self.data, self.sample_ids, taxon_ids)
    }

    /// Return a copy with rows sorted by sample label.
    pub fn sort_rows(&self) -> Self {
        let mut order: Vec<usize> = (0..self.n_samples()).collect();
        order.sort_by(|&a, &b| self.sample_ids[a].cmp(&self.sample_ids[b]));
        Self {
            data: self.data.select_rows(&order),
            sample_ids: order.iter().map(|&i| self.sample_ids[i].clone()).collect(),
            taxon_ids: self.taxon_ids.clone(),
        }
    }

    /// Return a copy with columns ordered by descending total abundance.
    ///
    /// The sort is stable: taxa with equal totals keep their current order.
    pub fn sort_columns(&self) -> Self {
        let sums = self.col_sums();
        let mut order: Vec<usize> = (0..self.n_taxa()).collect();
        order.sort_by(|&a, &b| sums[b].total_cmp(&sums[a]));
        Self {
            data: self.data.select_columns(&order),
            sample_ids: self.sample_ids.clone(),
            taxon_ids: order.iter().map(|&i| self.taxon_ids[i].clone()).collect(),
        }
    }

    /// Write the table as CSV: a `name` column followed by one column per taxon.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = Vec::with_capacity(self.n_taxa() + 1);
        header.push("name");
        header.extend(self.taxon_ids.iter().map(|s| s.as_str()));
        csv_writer.write_record(&header)?;

        for (row, sample_id) in self.sample_ids.iter().enumerate() {
            let mut record = Vec::with_capacity(self.n_taxa() + 1);
            record.push(sample_id.clone());
            record.extend(self.data.row(row).iter().map(|v| v.to_string()));
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Write the table to a CSV file.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))
    }
}

/// Reorder columns by descending column sum.
///
/// Pure and deterministic; ties keep their original order.
pub fn sort_columns(table: &AbundanceTable) -> AbundanceTable {
    table.sort_columns()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_table() -> AbundanceTable {
        // 3 samples × 4 taxa
        let data = DMatrix::from_row_slice(
            3,
            4,
            &[
                1.0, 10.0, 0.0, 5.0, //
                2.0, 20.0, 0.0, 0.0, //
                3.0, 0.0, 0.0, 1.0,
            ],
        );
        let sample_ids = vec!["S2".into(), "S1".into(), "S3".into()];
        let taxon_ids = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        AbundanceTable::new(data, sample_ids, taxon_ids).unwrap()
    }

    #[test]
    fn test_dimensions() {
        let table = create_test_table();
        assert_eq!(table.n_samples(), 3);
        assert_eq!(table.n_taxa(), 4);
    }

    #[test]
    fn test_dimension_mismatch() {
        let data = DMatrix::zeros(2, 2);
        let result = AbundanceTable::new(data, vec!["S1".into()], vec!["a".into(), "b".into()]);
        assert!(matches!(
            result,
            Err(VirError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_duplicate_samples_rejected() {
        let data = DMatrix::zeros(2, 1);
        let result = AbundanceTable::new(data, vec!["S1".into(), "S1".into()], vec!["a".into()]);
        assert!(matches!(result, Err(VirError::DuplicateSample(id)) if id == "S1"));
    }

    #[test]
    fn test_sums() {
        let table = create_test_table();
        assert_eq!(table.row_sums(), vec![16.0, 22.0, 4.0]);
        assert_eq!(table.col_sums(), vec![6.0, 30.0, 0.0, 6.0]);
    }

    #[test]
    fn test_sort_rows() {
        let table = create_test_table().sort_rows();
        assert_eq!(table.sample_ids(), &["S1", "S2", "S3"]);
        assert_eq!(table.row(0), vec![2.0, 20.0, 0.0, 0.0]);
    }

    #[test]
    fn test_sort_columns_stable() {
        let table = sort_columns(&create_test_table());
        // a and d tie at 6.0 and keep their relative order
        assert_eq!(table.taxon_ids(), &["b", "a", "d", "c"]);
        assert_eq!(table.column(0), vec![10.0, 20.0, 0.0]);
    }

    #[test]
    fn test_from_records_fills_zero() {
        let records = vec![
            SampleRecord::new("A", vec![("x".into(), 1.0), ("y".into(), 2.0)]),
            SampleRecord::new("B", vec![("z".into(), 3.0), ("x".into(), 4.0)]),
        ];
        let table = AbundanceTable::from_records(&records).unwrap();
        assert_eq!(table.taxon_ids(), &["x", "y", "z"]);
        assert_eq!(table.row(0), vec![1.0, 2.0, 0.0]);
        assert_eq!(table.row(1), vec![4.0, 0.0, 3.0]);
    }

    #[test]
    fn test_subset() {
        let table = create_test_table();
        let samples = table.subset_samples(&[2, 0]).unwrap();
        assert_eq!(samples.sample_ids(), &["S3", "S2"]);
        assert_eq!(samples.get(0, 0), 3.0);

        let taxa = table.subset_taxa(&[3]).unwrap();
        assert_eq!(taxa.taxon_ids(), &["d"]);
        assert_eq!(taxa.column(0), vec![5.0, 0.0, 1.0]);

        assert!(table.subset_taxa(&[9]).is_err());
    }

    #[test]
    fn test_add_column_into() {
        let mut table = create_test_table();
        table.add_column_into(3, 0);
        assert_eq!(table.column(0), vec![6.0, 2.0, 4.0]);
    }

    #[test]
    fn test_get_by_label() {
        let table = create_test_table();
        assert_eq!(table.get_by_label("S1", "b"), Some(20.0));
        assert_eq!(table.get_by_label("S1", "zz"), None);
    }

    #[test]
    fn test_write_csv() {
        let table = create_test_table().subset_taxa(&[0, 1]).unwrap();
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name,a,b");
        assert_eq!(lines[1], "S2,1,10");
        assert_eq!(lines.len(), 4);
    }
}
