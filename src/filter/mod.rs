//! Filtering primitives for abundance tables.

pub mod empty;
pub mod spike;

pub use empty::{drop_empty_samples, EmptySampleFilterResult};
pub use spike::{is_spike_taxon, remove_spike, SpikeHandling, SpikeRemovalResult, SPIKE_TAXA};
