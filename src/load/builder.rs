//! Abundance table builder.
//!
//! Turns a set of per-sample JSON files into one validated table:
//!
//! 1. discover input files (control runs excluded) and check their count
//! 2. parse each file and label it through the injected [`SampleNamer`]
//! 3. align samples into a table, sort rows by label and columns by
//!    descending total
//! 4. optionally split composite `species,phylum` labels
//! 5. optionally remove spike-in controls
//! 6. optionally sum columns by phylum
//! 7. optionally drop empty samples
//! 8. optionally scale every row to sum to 1

use crate::aggregate::{aggregate_columns, split_composite_labels};
use crate::data::{AbundanceTable, SampleRecord};
use crate::error::{Result, VirError};
use crate::filter::{
    drop_empty_samples, remove_spike, EmptySampleFilterResult, SpikeHandling, SpikeRemovalResult,
};
use crate::load::discover::{discover_files, FilePattern, DEFAULT_EXCLUDE};
use crate::naming::{CleanFileName, SampleNamer, SurveyNaming};
use crate::normalize::{norm_tss, scale};
use log::{debug, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Options controlling table construction.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Number of input files the run must find; `None` skips the check.
    pub expected_files: Option<usize>,
    /// Spike-in handling.
    pub spike: SpikeHandling,
    /// Scale each row to sum to 1 (default: true).
    pub normalize: bool,
    /// Column labels are `species,phylum`; the result is keyed by phylum.
    pub phylum_mode: bool,
    /// Drop samples whose total is exactly zero (default: false).
    pub drop_empty: bool,
    /// File-name fragments marking control runs to skip.
    pub exclude: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            expected_files: None,
            spike: SpikeHandling::Keep,
            normalize: true,
            phylum_mode: false,
            drop_empty: false,
            exclude: DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LoadOptions {
    /// Number of samples in the first survey.
    pub const SURVEY_FILES: usize = 36;
    /// Number of samples in the second, larger batch.
    pub const BATCH_FILES: usize = 281;

    /// Options for the survey dataset.
    pub fn survey() -> Self {
        Self::default().expected_files(Self::SURVEY_FILES)
    }

    /// Options for the large batch: empty samples are dropped.
    pub fn batch() -> Self {
        Self::default()
            .expected_files(Self::BATCH_FILES)
            .drop_empty(true)
    }

    /// Require exactly `n` input files. Zero disables the check.
    pub fn expected_files(mut self, n: usize) -> Self {
        self.expected_files = (n > 0).then_some(n);
        self
    }

    /// Set spike-in handling.
    pub fn spike(mut self, spike: SpikeHandling) -> Self {
        self.spike = spike;
        self
    }

    /// Enable or disable row normalization.
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Enable or disable phylum mode.
    pub fn phylum_mode(mut self, phylum_mode: bool) -> Self {
        self.phylum_mode = phylum_mode;
        self
    }

    /// Enable or disable empty-sample removal.
    pub fn drop_empty(mut self, drop_empty: bool) -> Self {
        self.drop_empty = drop_empty;
        self
    }

    /// Replace the control-run exclusion list.
    pub fn exclude<S: AsRef<str>>(mut self, fragments: &[S]) -> Self {
        self.exclude = fragments.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }
}

/// A finished table plus what happened while building it.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// The finished table.
    pub table: AbundanceTable,
    /// Input files read, in encounter order.
    pub files: Vec<PathBuf>,
    /// Spike-in removal outcome.
    pub spike: SpikeRemovalResult,
    /// Empty-sample removal outcome, if enabled.
    pub empty: Option<EmptySampleFilterResult>,
}

/// Builds abundance tables from per-sample classifier outputs.
pub struct AbundanceTableBuilder {
    namer: Box<dyn SampleNamer>,
    options: LoadOptions,
}

impl std::fmt::Debug for AbundanceTableBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbundanceTableBuilder")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl AbundanceTableBuilder {
    /// Create a builder with default options.
    pub fn new<N: SampleNamer + 'static>(namer: N) -> Self {
        Self {
            namer: Box::new(namer),
            options: LoadOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Build a table from all files matching `pattern`.
    pub fn load<P: AsRef<Path>>(&self, pattern: P) -> Result<AbundanceTable> {
        Ok(self.load_with_report(pattern)?.table)
    }

    /// Build a table from all files matching `pattern`, keeping the report.
    ///
    /// # Errors
    /// - `FileCountMismatch` if an expected count is set and differs
    /// - `EmptyData` if no file matches
    /// - any parsing, naming, or integrity error from the later steps
    pub fn load_with_report<P: AsRef<Path>>(&self, pattern: P) -> Result<LoadReport> {
        let pattern = FilePattern::new(pattern)?;
        let files = discover_files(&pattern, &self.options.exclude)?;

        if let Some(expected) = self.options.expected_files {
            if files.len() != expected {
                return Err(VirError::FileCountMismatch {
                    expected,
                    actual: files.len(),
                });
            }
        }
        if files.is_empty() {
            return Err(VirError::EmptyData(format!(
                "no input files match {}",
                pattern.as_str()
            )));
        }
        info!("{} files", files.len());

        self.load_files(files)
    }

    /// Build a table from an explicit list of files.
    ///
    /// The expected-count check is not applied; files are read in the given
    /// order, which decides tie-breaks between equally abundant taxa.
    pub fn load_files(&self, files: Vec<PathBuf>) -> Result<LoadReport> {
        if files.is_empty() {
            return Err(VirError::EmptyData("no input files".to_string()));
        }

        let records: Vec<SampleRecord> = files
            .par_iter()
            .map(|path| {
                let label = self.namer.sample_label(path)?;
                debug!("{} -> {}", path.display(), label);
                SampleRecord::from_json_file(label, path)
            })
            .collect::<Result<Vec<_>>>()?;

        let (table, spike, empty) = self.build(&records)?;
        Ok(LoadReport {
            table,
            files,
            spike,
            empty,
        })
    }

    /// Build a table from already parsed records.
    pub fn build_from_records(&self, records: &[SampleRecord]) -> Result<AbundanceTable> {
        Ok(self.build(records)?.0)
    }

    fn build(
        &self,
        records: &[SampleRecord],
    ) -> Result<(AbundanceTable, SpikeRemovalResult, Option<EmptySampleFilterResult>)> {
        let options = &self.options;
        let mut table = AbundanceTable::from_records(records)?
            .sort_rows()
            .sort_columns();

        // Spike removal works on species labels; phylum labels come back after.
        let phylum = if options.phylum_mode {
            let split = split_composite_labels(table.taxon_ids())?;
            table = table.with_taxon_ids(split.species)?;
            Some(split.phylum)
        } else {
            None
        };

        let (spiked, spike) = remove_spike(&table, &options.spike)?;
        table = spiked;

        if let Some(phylum) = phylum {
            let kept: Vec<String> = spike
                .kept_indices
                .iter()
                .map(|&i| phylum[i].clone())
                .collect();
            table = aggregate_columns(&table, &kept)?.sort_columns();
        }

        let empty = if options.drop_empty {
            let (filtered, result) = drop_empty_samples(&table)?;
            table = filtered;
            Some(result)
        } else {
            None
        };

        if options.normalize {
            table = norm_tss(&table, scale::PROPORTION)?;
        }

        Ok((table, spike, empty))
    }
}

/// Load the survey dataset with survey naming.
///
/// `expected_files` of zero skips the file-count check.
pub fn load_data<P: AsRef<Path>>(
    pattern: P,
    spike: SpikeHandling,
    expected_files: usize,
    normalize: bool,
    phylum_mode: bool,
) -> Result<AbundanceTable> {
    let options = LoadOptions::default()
        .expected_files(expected_files)
        .spike(spike)
        .normalize(normalize)
        .phylum_mode(phylum_mode);
    AbundanceTableBuilder::new(SurveyNaming)
        .with_options(options)
        .load(pattern)
}

/// Load a large batch: file-name labels, empty samples dropped.
///
/// `expected_files` of zero skips the file-count check.
pub fn load_batch_data<P: AsRef<Path>>(
    pattern: P,
    spike: SpikeHandling,
    expected_files: usize,
    normalize: bool,
    phylum_mode: bool,
) -> Result<AbundanceTable> {
    let options = LoadOptions::batch()
        .expected_files(expected_files)
        .spike(spike)
        .normalize(normalize)
        .phylum_mode(phylum_mode);
    AbundanceTableBuilder::new(CleanFileName::default())
        .with_options(options)
        .load(pattern)
}
