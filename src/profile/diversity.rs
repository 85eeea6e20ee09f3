//! Per-sample alpha diversity and its summary by survey group.

use crate::data::AbundanceTable;
use crate::naming::{sample_group, SurveyGroup};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Diversity of a single sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDiversity {
    /// Sample label.
    pub sample_id: String,
    /// Shannon entropy (natural log) of the sample's composition.
    pub shannon: f64,
    /// Number of taxa with non-zero abundance.
    pub richness: usize,
    /// Total abundance of the sample.
    pub total: f64,
}

/// Diversity of every sample in a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiversityProfile {
    /// One entry per sample, in table order.
    pub samples: Vec<SampleDiversity>,
}

/// Mean and spread of diversity within one survey group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDiversity {
    pub group: SurveyGroup,
    pub n_samples: usize,
    pub mean_shannon: f64,
    /// Sample standard deviation; NaN for fewer than two samples.
    pub std_shannon: f64,
    pub mean_richness: f64,
    pub std_richness: f64,
}

/// Shannon entropy of a composition, `-Σ p ln p`.
///
/// Values are scaled to proportions first. Zeros contribute nothing; an
/// all-zero sample has entropy 0.
pub fn shannon_entropy(values: &[f64]) -> f64 {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    values
        .iter()
        .filter(|&&v| v > 0.0)
        .map(|&v| {
            let p = v / total;
            -p * p.ln()
        })
        .sum()
}

/// Compute Shannon entropy and richness for every sample.
pub fn profile_diversity(table: &AbundanceTable) -> DiversityProfile {
    let samples = (0..table.n_samples())
        .into_par_iter()
        .map(|i| {
            let row = table.row(i);
            SampleDiversity {
                sample_id: table.sample_ids()[i].clone(),
                shannon: shannon_entropy(&row),
                richness: row.iter().filter(|&&v| v > 0.0).count(),
                total: row.iter().sum(),
            }
        })
        .collect();
    DiversityProfile { samples }
}

impl DiversityProfile {
    /// Summarize samples by survey group. Groups without samples are omitted;
    /// samples without a group are ignored.
    pub fn summarize_by_group(&self) -> Vec<GroupDiversity> {
        SurveyGroup::ALL
            .into_iter()
            .filter_map(|group| {
                let members: Vec<&SampleDiversity> = self
                    .samples
                    .iter()
                    .filter(|s| sample_group(&s.sample_id) == Some(group))
                    .collect();
                if members.is_empty() {
                    return None;
                }
                let shannon: Vec<f64> = members.iter().map(|s| s.shannon).collect();
                let richness: Vec<f64> = members.iter().map(|s| s.richness as f64).collect();
                Some(GroupDiversity {
                    group,
                    n_samples: members.len(),
                    mean_shannon: shannon.iter().mean(),
                    std_shannon: shannon.iter().std_dev(),
                    mean_richness: richness.iter().mean(),
                    std_richness: richness.iter().std_dev(),
                })
            })
            .collect()
    }
}

impl std::fmt::Display for DiversityProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diversity Profile")?;
        writeln!(f, "  {:<24} {:>10} {:>9}", "sample", "shannon", "richness")?;
        for s in &self.samples {
            writeln!(f, "  {:<24} {:>10.4} {:>9}", s.sample_id, s.shannon, s.richness)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for GroupDiversity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<12} n={:<3} shannon {:.3} +- {:.3}  richness {:.1} +- {:.1}",
            self.group.label(),
            self.n_samples,
            self.mean_shannon,
            self.std_shannon,
            self.mean_richness,
            self.std_richness
        )
    }
}
