//! Data structures for abundance tables.

mod abundance_table;
mod sample;

pub use abundance_table::{sort_columns, AbundanceTable};
pub use sample::SampleRecord;
