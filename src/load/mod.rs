//! Construction of abundance tables from per-sample classifier outputs.

mod builder;
mod discover;

pub use builder::{load_batch_data, load_data, AbundanceTableBuilder, LoadOptions, LoadReport};
pub use discover::{discover_files, FilePattern, DEFAULT_EXCLUDE};
