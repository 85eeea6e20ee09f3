//! virome - wastewater virome abundance CLI
//!
//! Builds the samples × taxa abundance table from per-sample classifier
//! outputs and runs the reports that consume it.

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::path::{Path, PathBuf};
use ww_virome::config::{Config, InputFamily};
use ww_virome::error::{Result, VirError};
use ww_virome::export::{
    bray_curtis, export_descriptors_csv, export_distance_csv, export_table_csv, sample_descriptors,
};
use ww_virome::filter::SpikeHandling;
use ww_virome::load::{AbundanceTableBuilder, LoadOptions, LoadReport};
use ww_virome::naming::{CleanFileName, SurveyNaming};
use ww_virome::profile::{profile_diversity, profile_sparsity};

/// How sample labels are derived from file names
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Naming {
    /// Survey labels such as 1.Euro_Tur_111622
    Survey,
    /// File name without directory and known suffixes
    File,
}

/// Report output format
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Yaml,
}

/// Options shared by every command that builds a table
#[derive(Debug, Args)]
struct LoadArgs {
    /// Configuration file with dataDir and wsDataDir
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Named input family under the configured data directory
    #[arg(short, long, value_enum, required_unless_present = "pattern", conflicts_with = "pattern")]
    family: Option<InputFamily>,

    /// Explicit file pattern, e.g. "data/ww-kraken/*.tid.json"
    #[arg(short, long)]
    pattern: Option<String>,

    /// Number of input files expected; 0 disables the check.
    /// Defaults to 36 for the survey and 281 for the batch with --family,
    /// and to 0 with --pattern.
    #[arg(short, long)]
    expected: Option<usize>,

    /// Spike-in handling: keep, drop, or fold:<column>
    #[arg(short, long, default_value = "keep")]
    spike: SpikeHandling,

    /// Keep raw values instead of scaling rows to sum to 1
    #[arg(long)]
    no_normalize: bool,

    /// Column labels are "species,phylum"; aggregate by phylum
    #[arg(long)]
    phylum: bool,

    /// Large-batch mode: file-name labels and empty samples dropped
    #[arg(long)]
    batch: bool,

    /// Sample naming convention (default: file for batch, survey otherwise)
    #[arg(long, value_enum)]
    naming: Option<Naming>,
}

/// Wastewater virome abundance tables
#[derive(Parser)]
#[command(name = "virome")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the abundance table and write it as CSV
    Build {
        #[command(flatten)]
        load: LoadArgs,

        /// Output path for the table CSV
        #[arg(short, long, default_value = "data.csv")]
        output: PathBuf,

        /// Resolve the output path under the workspace directory
        #[arg(long)]
        workspace: bool,
    },

    /// Profile the abundance table: sparsity and diversity per survey group
    Profile {
        #[command(flatten)]
        load: LoadArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Export Bray-Curtis distances and grouping factors for PERMANOVA
    Distance {
        #[command(flatten)]
        load: LoadArgs,

        /// Output path for the distance matrix
        #[arg(long, default_value = "dist.csv")]
        dist: PathBuf,

        /// Output path for the grouping factors
        #[arg(long, default_value = "meta.csv")]
        meta: PathBuf,

        /// Resolve output paths under the workspace directory
        #[arg(long)]
        workspace: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            load,
            output,
            workspace,
        } => cmd_build(&load, &output, workspace),

        Commands::Profile { load, format } => cmd_profile(&load, format),

        Commands::Distance {
            load,
            dist,
            meta,
            workspace,
        } => cmd_distance(&load, &dist, &meta, workspace),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

impl LoadArgs {
    fn read_config(&self) -> Result<Config> {
        Config::from_json_file(&self.config)
    }

    fn is_batch(&self) -> bool {
        self.batch || self.family.is_some_and(|f| f.is_batch())
    }

    fn is_phylum(&self) -> bool {
        self.phylum || self.family.is_some_and(|f| f.is_composite())
    }

    fn pattern(&self) -> Result<PathBuf> {
        match (&self.family, &self.pattern) {
            (Some(family), _) => Ok(family.pattern(&self.read_config()?)),
            (None, Some(pattern)) => Ok(PathBuf::from(pattern)),
            (None, None) => Err(VirError::InvalidParameter(
                "either --family or --pattern is required".to_string(),
            )),
        }
    }

    fn options(&self) -> LoadOptions {
        let base = if self.is_batch() {
            LoadOptions::batch()
        } else {
            LoadOptions::survey()
        };
        let expected = match (self.expected, &self.family) {
            (Some(n), _) => n,
            (None, Some(_)) => base.expected_files.unwrap_or(0),
            (None, None) => 0,
        };
        base.expected_files(expected)
            .spike(self.spike.clone())
            .normalize(!self.no_normalize)
            .phylum_mode(self.is_phylum())
    }

    fn builder(&self) -> AbundanceTableBuilder {
        let naming = self.naming.unwrap_or(if self.is_batch() {
            Naming::File
        } else {
            Naming::Survey
        });
        let builder = match naming {
            Naming::Survey => AbundanceTableBuilder::new(SurveyNaming),
            Naming::File => AbundanceTableBuilder::new(CleanFileName::default()),
        };
        builder.with_options(self.options())
    }

    fn load(&self) -> Result<LoadReport> {
        let pattern = self.pattern()?;
        info!("Loading {}", pattern.display());
        let report = self.builder().load_with_report(&pattern)?;
        info!(
            "Loaded {} samples x {} taxa",
            report.table.n_samples(),
            report.table.n_taxa()
        );
        Ok(report)
    }

    fn output_path(&self, path: &Path, workspace: bool) -> Result<PathBuf> {
        if workspace {
            Ok(self.read_config()?.workspace_path(path))
        } else {
            Ok(path.to_path_buf())
        }
    }
}

/// Build the table and write it as CSV
fn cmd_build(load: &LoadArgs, output: &Path, workspace: bool) -> Result<()> {
    let report = load.load()?;
    let output = load.output_path(output, workspace)?;

    export_table_csv(&report.table, &output)?;

    println!(
        "{} samples x {} taxa written to {}",
        report.table.n_samples(),
        report.table.n_taxa(),
        output.display()
    );
    Ok(())
}

/// Profile the table
fn cmd_profile(load: &LoadArgs, format: Format) -> Result<()> {
    let report = load.load()?;
    let table = &report.table;

    let sparsity = profile_sparsity(table);
    let diversity = profile_diversity(table);
    let groups = diversity.summarize_by_group();

    let summary = serde_json::json!({
        "dimensions": {
            "n_files": report.files.len(),
            "n_samples": table.n_samples(),
            "n_taxa": table.n_taxa()
        },
        "spike_removed": report.spike.removed,
        "empty_samples_removed": report.empty.as_ref().map(|e| &e.removed_samples),
        "sparsity": {
            "total_entries": sparsity.total_entries,
            "non_zero": sparsity.nonzero_entries,
            "zero": sparsity.zero_entries,
            "sparsity": sparsity.sparsity
        },
        "diversity": diversity.samples,
        "groups": groups
    });

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        Format::Yaml => println!("{}", serde_yaml::to_string(&summary)?),
        Format::Text => {
            println!("Abundance Profile");
            println!("=================");
            println!();
            println!("Dimensions:");
            println!("  Files:   {}", report.files.len());
            println!("  Samples: {}", table.n_samples());
            println!("  Taxa:    {}", table.n_taxa());
            println!();
            if !report.spike.removed.is_empty() {
                print!("{}", report.spike);
                println!();
            }
            if let Some(empty) = &report.empty {
                print!("{}", empty);
                println!();
            }
            print!("{}", sparsity);
            if sparsity.is_highly_sparse() {
                println!("  (more than half of all entries are zero)");
            }
            println!();
            print!("{}", diversity);
            if !groups.is_empty() {
                println!();
                println!("By group:");
                for group in &groups {
                    println!("  {}", group);
                }
            }
        }
    }

    Ok(())
}

/// Export Bray-Curtis distances and grouping factors
fn cmd_distance(load: &LoadArgs, dist: &Path, meta: &Path, workspace: bool) -> Result<()> {
    let report = load.load()?;
    let descriptors = sample_descriptors(&report.table)?;
    let distances = bray_curtis(&report.table);

    let dist = load.output_path(dist, workspace)?;
    let meta = load.output_path(meta, workspace)?;

    info!("Writing distances to {:?}...", dist);
    export_distance_csv(&distances, &dist)?;
    info!("Writing grouping factors to {:?}...", meta);
    export_descriptors_csv(&descriptors, &meta)?;

    println!(
        "{} x {} distance matrix written to {}",
        distances.n_samples(),
        distances.n_samples(),
        dist.display()
    );
    Ok(())
}
