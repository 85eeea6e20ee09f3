//! Bray–Curtis dissimilarity between samples and the grouping factors that
//! go with it.
//!
//! The distance matrix and the descriptor table are written for external
//! PERMANOVA tools: the matrix without header or index, the descriptors as
//! `batch,part,loc` in the same row order.

use crate::data::AbundanceTable;
use crate::error::Result;
use crate::naming::SampleDescriptor;
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Symmetric sample × sample distance matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    /// Distances (samples × samples).
    pub data: DMatrix<f64>,
    /// Sample labels, in row/column order.
    pub sample_ids: Vec<String>,
}

impl DistanceMatrix {
    /// Distance between samples `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[(i, j)]
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Write the matrix as CSV with no header and no index column.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        for row in self.data.row_iter() {
            csv_writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn bray_curtis_pair(u: &[f64], v: &[f64]) -> f64 {
    let (num, den) = u
        .iter()
        .zip(v)
        .fold((0.0, 0.0), |(num, den), (&a, &b)| {
            (num + (a - b).abs(), den + (a + b).abs())
        });
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Pairwise Bray–Curtis dissimilarity `Σ|u−v| / Σ|u+v|` between rows.
///
/// Two all-zero samples are at distance 0.
pub fn bray_curtis(table: &AbundanceTable) -> DistanceMatrix {
    let n = table.n_samples();
    let rows: Vec<Vec<f64>> = (0..n).map(|i| table.row(i)).collect();

    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            ((i + 1)..n)
                .map(|j| bray_curtis_pair(&rows[i], &rows[j]))
                .collect()
        })
        .collect();

    let mut data = DMatrix::zeros(n, n);
    for (i, row) in upper.iter().enumerate() {
        for (offset, &d) in row.iter().enumerate() {
            let j = i + 1 + offset;
            data[(i, j)] = d;
            data[(j, i)] = d;
        }
    }

    DistanceMatrix {
        data,
        sample_ids: table.sample_ids().to_vec(),
    }
}

/// Parse the grouping factors of every sample label in the table.
pub fn sample_descriptors(table: &AbundanceTable) -> Result<Vec<SampleDescriptor>> {
    table
        .sample_ids()
        .iter()
        .map(|id| SampleDescriptor::parse(id))
        .collect()
}

/// Write a distance matrix to a CSV file.
pub fn export_distance_csv<P: AsRef<Path>>(distances: &DistanceMatrix, path: P) -> Result<()> {
    let file = File::create(path)?;
    distances.write_csv(BufWriter::new(file))
}

/// Write `batch,part,loc` rows to a CSV file.
pub fn export_descriptors_csv<P: AsRef<Path>>(
    descriptors: &[SampleDescriptor],
    path: P,
) -> Result<()> {
    let file = File::create(path)?;
    let mut csv_writer = csv::Writer::from_writer(BufWriter::new(file));
    for descriptor in descriptors {
        csv_writer.serialize(descriptor)?;
    }
    csv_writer.flush()?;
    Ok(())
}
