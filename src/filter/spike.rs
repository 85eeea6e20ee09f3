//! Removal of spike-in control taxa.
//!
//! Control organisms are added to every sample at a known amount and must be
//! excluded before biological analysis. The same organism appears under
//! several identifiers depending on the classifier output family (RefSeq
//! accession, taxonomic ID, free-text name), so the spike set lists all of
//! them.

use crate::data::AbundanceTable;
use crate::error::{Result, VirError};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Labels of spike-in control taxa, in removal order.
pub const SPIKE_TAXA: &[&str] = &[
    "NC_003045", // Bovine coronavirus
    "NC_006213", // Human coronavirus OC43
    "NC_001405", // Human mastadenovirus C
    "NC_001454", // Human mastadenovirus F
    "NC_001401", // Adeno-associated virus 2
    // Tax IDs
    "694003",
    "129951",
    "130309",
    "2955291",
    "1986019",
    "130310",
    // Coronavirus spike, by name
    "Bovine coronavirus",
    "Human coronavirus OC43",
    "Betacoronavirus 1",
    "Rabbit coronavirus HKU14",
    "Betacoronavirus",
    // Adenovirus
    "Human adenovirus 1",
    "Human mastadenovirus A",
    "Human mastadenovirus B",
    "Human mastadenovirus C",
    "Human mastadenovirus D",
    "Human mastadenovirus E",
    "Human mastadenovirus F",
    "Human mastadenovirus G",
    "Simian mastadenovirus B",
    "Simian mastadenovirus C",
    "Simian mastadenovirus F",
    "adeno-associated virus 2",
    "Mastadenovirus",
    // Flu
    "Alphainfluenzavirus influenzae",
];

/// Whether a label belongs to the spike set.
pub fn is_spike_taxon(label: &str) -> bool {
    SPIKE_TAXA.contains(&label)
}

/// What to do with spike-in columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpikeHandling {
    /// Leave spike-in columns in the table.
    #[default]
    Keep,
    /// Remove spike-in columns.
    Drop,
    /// Add spike-in values into the named residual column, then remove them.
    FoldInto(String),
}

impl SpikeHandling {
    /// Whether any spike-in columns will be removed.
    pub fn removes(&self) -> bool {
        !matches!(self, SpikeHandling::Keep)
    }
}

impl fmt::Display for SpikeHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpikeHandling::Keep => write!(f, "keep"),
            SpikeHandling::Drop => write!(f, "drop"),
            SpikeHandling::FoldInto(column) => write!(f, "fold:{}", column),
        }
    }
}

impl FromStr for SpikeHandling {
    type Err = VirError;

    /// Parses `keep`/`none`/`0`, `drop`/`1`, or `fold:<column>`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "keep" | "none" | "0" => Ok(SpikeHandling::Keep),
            "drop" | "1" => Ok(SpikeHandling::Drop),
            _ => match s.strip_prefix("fold:") {
                Some(column) if !column.is_empty() => {
                    Ok(SpikeHandling::FoldInto(column.to_string()))
                }
                _ => Err(VirError::InvalidParameter(format!(
                    "unknown spike handling '{}': expected keep, drop, or fold:<column>",
                    s
                ))),
            },
        }
    }
}

/// Outcome of spike-in removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeRemovalResult {
    /// Spike-in labels found and removed, in removal order.
    pub removed: Vec<String>,
    /// Original indices of the retained columns.
    pub kept_indices: Vec<usize>,
    /// Residual column the spike values were added to, if any were folded.
    pub residual: Option<String>,
}

impl fmt::Display for SpikeRemovalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Spike Removal Result")?;
        writeln!(f, "  Taxa removed: {}", self.removed.len())?;
        for label in &self.removed {
            writeln!(f, "  - {}", label)?;
        }
        if let Some(residual) = &self.residual {
            writeln!(f, "  Folded into: {}", residual)?;
        }
        Ok(())
    }
}

/// Remove spike-in columns from a table.
///
/// Walks [`SPIKE_TAXA`] in order. Every column labelled with a spike taxon
/// is excluded; with [`SpikeHandling::FoldInto`], its values are first added
/// to the residual column. Removed labels are logged.
///
/// # Errors
/// Fails if the residual column is itself a spike taxon, or if a spike
/// column has to be folded and the residual column does not exist.
pub fn remove_spike(
    table: &AbundanceTable,
    handling: &SpikeHandling,
) -> Result<(AbundanceTable, SpikeRemovalResult)> {
    let all: Vec<usize> = (0..table.n_taxa()).collect();
    if !handling.removes() {
        return Ok((
            table.clone(),
            SpikeRemovalResult {
                removed: Vec::new(),
                kept_indices: all,
                residual: None,
            },
        ));
    }

    let residual = match handling {
        SpikeHandling::FoldInto(column) => {
            if is_spike_taxon(column) {
                return Err(VirError::InvalidParameter(format!(
                    "residual column '{}' is itself a spike-in taxon",
                    column
                )));
            }
            Some(column)
        }
        _ => None,
    };

    info!("Removing spike:");
    let mut working = table.clone();
    let mut residual_idx = None;
    let mut keep = vec![true; table.n_taxa()];
    let mut removed = Vec::new();
    for &spike in SPIKE_TAXA {
        let matches: Vec<usize> = table
            .taxon_ids()
            .iter()
            .enumerate()
            .filter(|(_, id)| id.as_str() == spike)
            .map(|(i, _)| i)
            .collect();
        if matches.is_empty() {
            continue;
        }
        if let Some(column) = residual {
            // Resolved on first use: a table without spikes needs no residual.
            let into = match residual_idx {
                Some(idx) => idx,
                None => {
                    let idx = table
                        .taxon_index(column)
                        .ok_or_else(|| VirError::MissingColumn(column.clone()))?;
                    residual_idx = Some(idx);
                    idx
                }
            };
            for &col in &matches {
                working.add_column_into(col, into);
            }
        }
        for col in matches {
            keep[col] = false;
        }
        info!("- {}", spike);
        removed.push(spike.to_string());
    }

    let kept_indices: Vec<usize> = all.into_iter().filter(|&i| keep[i]).collect();
    let filtered = working.subset_taxa(&kept_indices)?;

    Ok((
        filtered,
        SpikeRemovalResult {
            removed,
            kept_indices,
            residual: residual_idx.and(residual.cloned()),
        },
    ))
}
