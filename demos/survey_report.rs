//! Survey report example.
//!
//! This example shows how to:
//! 1. Build an abundance table from per-sample JSON files
//! 2. Profile sparsity and diversity per survey group
//! 3. Compute Bray–Curtis distances between samples
//!
//! Pass a file pattern (e.g. `data/ww-kraken/*.tid.json`) to run it on real
//! classifier outputs; without one, a small synthetic survey is generated.

use std::fs;
use std::path::{Path, PathBuf};
use ww_virome::prelude::*;

fn main() -> Result<()> {
    println!("=== Wastewater Virome Survey ===\n");

    let synthetic = tempfile::TempDir::new()?;
    let pattern = match std::env::args().nth(1) {
        Some(pattern) => PathBuf::from(pattern),
        None => write_synthetic_survey(synthetic.path())?,
    };

    let report = AbundanceTableBuilder::new(SurveyNaming)
        .with_options(LoadOptions::default().spike(SpikeHandling::Drop))
        .load_with_report(&pattern)?;
    let table = &report.table;

    println!("Table dimensions:");
    println!("  Files:   {}", report.files.len());
    println!("  Samples: {}", table.n_samples());
    println!("  Taxa:    {}", table.n_taxa());
    println!();

    println!("{}", report.spike);

    println!("=== Most Abundant Taxa ===\n");
    let totals = table.col_sums();
    for (taxon, total) in table.taxon_ids().iter().zip(&totals).take(5) {
        println!("  {:<32} {:>8.3}", taxon, total);
    }
    println!();

    let sparsity = profile_sparsity(table);
    println!("Sparsity: {:.1}%", sparsity.sparsity * 100.0);
    println!(
        "  {} total entries, {} non-zero",
        sparsity.total_entries, sparsity.nonzero_entries
    );
    println!();

    println!("=== Diversity by Group ===\n");
    let diversity = profile_diversity(table);
    for group in diversity.summarize_by_group() {
        println!("  {}", group);
    }
    println!();

    println!("=== Bray–Curtis (first samples) ===\n");
    let distances = bray_curtis(table);
    let shown = distances.n_samples().min(4);
    for i in 0..shown {
        let row: Vec<String> = (0..shown)
            .map(|j| format!("{:.3}", distances.get(i, j)))
            .collect();
        println!("  {:<20} {}", distances.sample_ids[i], row.join("  "));
    }

    Ok(())
}

/// Write a synthetic two-batch survey and return its file pattern.
fn write_synthetic_survey(dir: &Path) -> Result<PathBuf> {
    let taxa = [
        "Tobamovirus",
        "Norovirus GII",
        "crAss-like phage",
        "Pepper mild mottle virus",
        "Human mastadenovirus F",
        "Enterovirus C",
    ];
    let first_batch = [
        "Euro_Tur_040722_S1",
        "Inh_Tur_040722_S2",
        "Euro_Wod_041522_S3",
        "Inh_Wod_041522_S4",
    ];
    let plate_wells = ["A1_S5", "A2_S6", "E2_S7", "H2_S8"];

    let mut seed = 12345u64;
    let mut rand_uniform = || -> f64 {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        ((seed >> 16) & 0x7FFF) as f64 / 32768.0
    };

    for name in first_batch.iter().chain(&plate_wells) {
        let mut sample = serde_json::Map::new();
        for (i, taxon) in taxa.iter().enumerate() {
            // Rarer taxa further down the list
            if rand_uniform() < 0.2 * i as f64 {
                continue;
            }
            let reads = (1000.0 * rand_uniform() / (i + 1) as f64).round();
            sample.insert(taxon.to_string(), serde_json::json!(reads));
        }
        let path = dir.join(format!("{}_L001.vir.json", name));
        fs::write(path, serde_json::to_string(&sample)?)?;
    }

    Ok(dir.join("*.vir.json"))
}
