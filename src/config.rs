//! Local configuration and named input families.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Directory layout of a local installation, read from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// General data directory.
    #[serde(rename = "dataDir")]
    pub data_dir: PathBuf,
    /// Workspace data directory.
    #[serde(rename = "wsDataDir")]
    pub ws_data_dir: PathBuf,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve a path relative to the workspace directory.
    pub fn workspace_path<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        self.ws_data_dir.join(relative)
    }
}

/// Classifier output families, one JSON file per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InputFamily {
    /// Viral species by name.
    ByName,
    /// Viral species by taxonomic ID.
    ByTid,
    /// Viral genera.
    ByGenus,
    /// Composite `species,phylum` labels.
    ByPhylum,
    /// Viruses plus an "other" bucket.
    VirOr,
    /// All species.
    AllSpecies,
    /// All genera.
    AllGenus,
    /// Reference-mapping abundances.
    Mindy,
    /// Second-batch viral species.
    Species2,
    /// Second-batch viral genera.
    Genus2,
}

impl InputFamily {
    /// File pattern relative to the data directory.
    pub fn relative_pattern(&self) -> &'static str {
        match self {
            InputFamily::ByName => "ww-kraken/*.vir.json",
            InputFamily::ByTid => "ww-kraken/*.tid.json",
            InputFamily::ByGenus => "ww-kraken/*.gen.json",
            InputFamily::ByPhylum => "ww-kraken/*.phy.json",
            InputFamily::VirOr => "ww-kraken/*.viror.json",
            InputFamily::AllSpecies => "ww-kraken/*.allsp.json",
            InputFamily::AllGenus => "ww-kraken/*.allgen.json",
            InputFamily::Mindy => "ww-mindy/*.json",
            InputFamily::Species2 => "ww2-kraken/*.vir.json",
            InputFamily::Genus2 => "ww2-kraken/*.gen.json",
        }
    }

    /// Full file pattern under the configured data directory.
    pub fn pattern(&self, config: &Config) -> PathBuf {
        config.data_dir.join(self.relative_pattern())
    }

    /// Whether the family belongs to the larger second batch.
    pub fn is_batch(&self) -> bool {
        matches!(self, InputFamily::Species2 | InputFamily::Genus2)
    }

    /// Whether column labels are composite `species,phylum` strings.
    pub fn is_composite(&self) -> bool {
        matches!(self, InputFamily::ByPhylum)
    }
}
