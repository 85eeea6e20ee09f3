//! Profiling primitives for understanding abundance table characteristics.

mod diversity;
mod sparsity;

pub use diversity::{
    profile_diversity, shannon_entropy, DiversityProfile, GroupDiversity, SampleDiversity,
};
pub use sparsity::{profile_sparsity, SparsityProfile};
