//! Re-aggregation of taxa at a coarser rank.

pub mod rank;

pub use rank::{aggregate_columns, split_composite_labels, CompositeLabels};
