//! Two-level taxon labels and summing columns that share a rank.
//!
//! Classifier outputs in the phylum family label each column
//! `"species,phylum"`. The species part identifies spike-in controls; the
//! phylum part is what the finished table is keyed by.

use crate::data::AbundanceTable;
use crate::error::{Result, VirError};
use nalgebra::DMatrix;
use std::collections::HashMap;

/// Column labels split into their species and phylum parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeLabels {
    /// Primary (species) labels, one per column.
    pub species: Vec<String>,
    /// Secondary (phylum) labels, one per column.
    pub phylum: Vec<String>,
}

/// Split `"species,phylum"` labels.
///
/// # Errors
/// `MalformedLabel` if a label does not split into exactly two parts.
pub fn split_composite_labels(labels: &[String]) -> Result<CompositeLabels> {
    let mut species = Vec::with_capacity(labels.len());
    let mut phylum = Vec::with_capacity(labels.len());
    for label in labels {
        let parts: Vec<&str> = label.split(',').collect();
        if parts.len() != 2 {
            return Err(VirError::MalformedLabel {
                label: label.clone(),
                parts: parts.len(),
            });
        }
        species.push(parts[0].to_string());
        phylum.push(parts[1].to_string());
    }
    Ok(CompositeLabels { species, phylum })
}

/// Sum columns that share a label in `labels`.
///
/// `labels` gives the new label of every column of `table`. Output columns
/// appear in order of each label's first occurrence.
pub fn aggregate_columns(table: &AbundanceTable, labels: &[String]) -> Result<AbundanceTable> {
    if labels.len() != table.n_taxa() {
        return Err(VirError::DimensionMismatch {
            expected: table.n_taxa(),
            actual: labels.len(),
        });
    }

    let mut groups: Vec<String> = Vec::new();
    let mut group_of: HashMap<&str, usize> = HashMap::new();
    let assignment: Vec<usize> = labels
        .iter()
        .map(|label| {
            *group_of.entry(label.as_str()).or_insert_with(|| {
                groups.push(label.clone());
                groups.len() - 1
            })
        })
        .collect();

    let mut data = DMatrix::zeros(table.n_samples(), groups.len());
    for (col, &group) in assignment.iter().enumerate() {
        let mut target = data.column_mut(group);
        target += table.data().column(col);
    }

    AbundanceTable::new(data, table.sample_ids().to_vec(), groups)
}
