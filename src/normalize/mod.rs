//! Normalization of abundance tables.
//!
//! - **TSS**: Total sum scaling / relative abundance per sample

pub mod tss;

pub use tss::{norm_tss, scale};
