//! Wastewater virome abundance tables
//!
//! This library turns per-sample taxonomic classification outputs into a
//! single samples × taxa abundance table and provides the reporting
//! primitives used on it.
//!
//! # Overview
//!
//! - **data**: Core data structures (AbundanceTable, SampleRecord)
//! - **load**: Table construction from JSON files (AbundanceTableBuilder)
//! - **naming**: Sample naming conventions and survey groups
//! - **filter**: Spike-in removal and empty-sample filtering
//! - **aggregate**: Composite `species,phylum` labels and rank aggregation
//! - **normalize**: Row normalization (TSS)
//! - **profile**: Sparsity and diversity profiling
//! - **export**: Bray–Curtis distances and grouping factors for external tools
//! - **config**: Local directory configuration and input families
//!
//! # Example
//!
//! ```no_run
//! use ww_virome::prelude::*;
//!
//! let config = Config::from_json_file("config.json").unwrap();
//! let table = AbundanceTableBuilder::new(SurveyNaming)
//!     .with_options(LoadOptions::survey().spike(SpikeHandling::Drop))
//!     .load(InputFamily::ByTid.pattern(&config))
//!     .unwrap();
//!
//! let diversity = profile_diversity(&table);
//! for group in diversity.summarize_by_group() {
//!     println!("{}", group);
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod filter;
pub mod load;
pub mod naming;
pub mod normalize;
pub mod profile;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::aggregate::{aggregate_columns, split_composite_labels, CompositeLabels};
    pub use crate::config::{Config, InputFamily};
    pub use crate::data::{sort_columns, AbundanceTable, SampleRecord};
    pub use crate::error::{Result, VirError};
    pub use crate::export::{
        bray_curtis, export_descriptors_csv, export_distance_csv, export_table_csv,
        sample_descriptors, DistanceMatrix,
    };
    pub use crate::filter::{
        drop_empty_samples, is_spike_taxon, remove_spike, EmptySampleFilterResult, SpikeHandling,
        SpikeRemovalResult, SPIKE_TAXA,
    };
    pub use crate::load::{
        discover_files, load_batch_data, load_data, AbundanceTableBuilder, FilePattern,
        LoadOptions, LoadReport,
    };
    pub use crate::naming::{
        clean_sample_label, sample_group, site_label, CleanFileName, SampleDescriptor,
        SampleNamer, SurveyGroup, SurveyNaming,
    };
    pub use crate::normalize::{norm_tss, scale};
    pub use crate::profile::{
        profile_diversity, profile_sparsity, shannon_entropy, DiversityProfile, GroupDiversity,
        SampleDiversity, SparsityProfile,
    };
}
