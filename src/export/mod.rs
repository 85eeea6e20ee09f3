//! Export of tables, distances, and grouping factors for external tools.

pub mod distance;
pub mod table;

pub use distance::{
    bray_curtis, export_descriptors_csv, export_distance_csv, sample_descriptors, DistanceMatrix,
};
pub use table::export_table_csv;
