//! Sample naming conventions.
//!
//! Each input file is one sample. Its row label in the abundance table is
//! derived from the file name by a [`SampleNamer`]. Two conventions exist:
//!
//! - [`CleanFileName`]: strip the directory and known suffixes
//!   (`Inh_Tur_111622_S3.vir.json` → `Inh_Tur_111622_S3`).
//! - [`SurveyNaming`]: the survey labels `<batch>.<part>_<site>_<date>`
//!   (`1.Euro_Tur_111622`), resolving second-batch well codes through a
//!   fixed plate map.

use crate::error::{Result, VirError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Derives a sample label from an input file path.
pub trait SampleNamer: Send + Sync {
    /// Row label for the sample stored at `path`.
    fn sample_label(&self, path: &Path) -> Result<String>;
}

impl<F> SampleNamer for F
where
    F: Fn(&Path) -> Result<String> + Send + Sync,
{
    fn sample_label(&self, path: &Path) -> Result<String> {
        self(path)
    }
}

/// Suffixes removed by [`clean_sample_label`], in order.
pub const DEFAULT_SUFFIXES: &[&str] = &[".json", ".vir", ".gen"];

fn base_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| VirError::UnknownSample(path.display().to_string()))
}

/// Strip directory and each of the default suffixes (once, in order).
pub fn clean_sample_label<P: AsRef<Path>>(file_path: P) -> Result<String> {
    CleanFileName::default().sample_label(file_path.as_ref())
}

/// Names samples by their cleaned file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanFileName {
    suffixes: Vec<String>,
}

impl Default for CleanFileName {
    fn default() -> Self {
        Self::with_suffixes(DEFAULT_SUFFIXES)
    }
}

impl CleanFileName {
    /// Use a custom suffix list.
    pub fn with_suffixes<S: AsRef<str>>(suffixes: &[S]) -> Self {
        Self {
            suffixes: suffixes.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}

impl SampleNamer for CleanFileName {
    fn sample_label(&self, path: &Path) -> Result<String> {
        let mut name = base_name(path)?;
        for suffix in &self.suffixes {
            name = name.strip_suffix(suffix.as_str()).unwrap_or(name);
        }
        Ok(name.to_string())
    }
}

/// Second-batch plate wells and the sample each holds.
const WELL_NAMES: &[(&str, &str)] = &[
    ("A1", "Euro_Tur_111622"),
    ("A2", "Inh_Tur_111622"),
    ("B1", "Euro_Tur_113022"),
    ("B2", "Inh_Tur_113022"),
    ("C1", "Euro_Tur_040722"),
    ("C2", "Inh_Tur_040722"),
    ("D1", "Euro_Wod_111622"),
    ("D2", "Inh_Wod_111622"),
    ("E1", "Euro_Wod_113022"),
    ("H1", "Inh_Wod_113022"),
    ("F1", "Euro_Wod_041522"),
    ("G1", "Inh_Wod_041522"),
    ("H2", "Euro_LB_111622"),
    ("E2", "Inh_LB_111622"),
    ("A3", "Euro_LB_113022"),
    ("F2", "Inh_LB_113022"),
    ("B3", "Euro_LB_041422"),
    ("G2", "Inh_LB_041422"),
];

/// Sample name to site/time-point code. Solid and influent parts of the
/// same collection share a code.
const SITE_CODES: &[(&str, &str)] = &[
    ("Euro_Tur_040722", "Tur1"),
    ("Inh_Tur_040722", "Tur1"),
    ("Euro_Tur_111622", "Tur2"),
    ("Inh_Tur_111622", "Tur2"),
    ("Euro_Tur_113022", "Tur3"),
    ("Inh_Tur_113022", "Tur3"),
    ("Euro_Wod_041522", "Wod1"),
    ("Inh_Wod_041522", "Wod1"),
    ("Euro_Wod_111622", "Wod2"),
    ("Inh_Wod_111622", "Wod2"),
    ("Euro_Wod_113022", "Wod3"),
    ("Inh_Wod_113022", "Wod3"),
    ("Euro_LB_041422", "LB1"),
    ("Inh_LB_041422", "LB1"),
    ("Euro_LB_111622", "LB2"),
    ("Inh_LB_111622", "LB2"),
    ("Euro_LB_113022", "LB3"),
    ("Inh_LB_113022", "LB3"),
];

fn survey_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(Euro|Inh)_[a-zA-Z]+_[0-9]+").expect("valid regex"))
}

/// Survey naming: `1.<name>` for first-batch files, `2.<name>` for plate wells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurveyNaming;

impl SampleNamer for SurveyNaming {
    fn sample_label(&self, path: &Path) -> Result<String> {
        let name = base_name(path)?;
        if name.starts_with("Euro_") || name.starts_with("Inh_") {
            let found = survey_name_re()
                .find(name)
                .ok_or_else(|| VirError::UnknownSample(name.to_string()))?;
            return Ok(format!("1.{}", found.as_str()));
        }
        let well = name
            .get(..2)
            .ok_or_else(|| VirError::UnknownSample(name.to_string()))?;
        WELL_NAMES
            .iter()
            .find(|(code, _)| *code == well)
            .map(|(_, sample)| format!("2.{}", sample))
            .ok_or_else(|| VirError::UnknownSample(name.to_string()))
    }
}

/// Site/time-point code of a survey label, e.g. `2.Inh_Wod_113022` → `Wod3`.
pub fn site_label(label: &str) -> Result<&'static str> {
    let name = label
        .get(2..)
        .ok_or_else(|| VirError::UnknownSample(label.to_string()))?;
    SITE_CODES
        .iter()
        .find(|(sample, _)| *sample == name)
        .map(|(_, site)| *site)
        .ok_or_else(|| VirError::UnknownSample(label.to_string()))
}

/// Survey groups: sample prep protocol version × sample part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SurveyGroup {
    V1Solid,
    V1Influent,
    V2Solid,
    V2Influent,
}

impl SurveyGroup {
    /// All groups in reporting order.
    pub const ALL: [SurveyGroup; 4] = [
        SurveyGroup::V1Solid,
        SurveyGroup::V1Influent,
        SurveyGroup::V2Solid,
        SurveyGroup::V2Influent,
    ];

    /// Label prefix identifying the group.
    pub fn prefix(&self) -> &'static str {
        match self {
            SurveyGroup::V1Solid => "1.Euro",
            SurveyGroup::V1Influent => "1.Inh",
            SurveyGroup::V2Solid => "2.Euro",
            SurveyGroup::V2Influent => "2.Inh",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            SurveyGroup::V1Solid => "v1 solid",
            SurveyGroup::V1Influent => "v1 influent",
            SurveyGroup::V2Solid => "v2 solid",
            SurveyGroup::V2Influent => "v2 influent",
        }
    }
}

impl std::fmt::Display for SurveyGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Group of a survey label, if it has one.
pub fn sample_group(label: &str) -> Option<SurveyGroup> {
    SurveyGroup::ALL
        .into_iter()
        .find(|group| label.starts_with(group.prefix()))
}

fn descriptor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\.([^_]+)_([^_]+)").expect("valid regex"))
}

/// Grouping factors of a survey label, as exported for external tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleDescriptor {
    /// Sample prep batch (1 or 2).
    pub batch: u32,
    /// Sample part (`Euro` solids or `Inh` influent).
    pub part: String,
    /// Collection site.
    #[serde(rename = "loc")]
    pub location: String,
}

impl SampleDescriptor {
    /// Parse `1.Euro_Tur_111622` into batch 1, part `Euro`, location `Tur`.
    pub fn parse(label: &str) -> Result<Self> {
        let caps = descriptor_re()
            .captures(label)
            .ok_or_else(|| VirError::UnknownSample(label.to_string()))?;
        let batch = caps[1]
            .parse()
            .map_err(|_| VirError::UnknownSample(label.to_string()))?;
        Ok(Self {
            batch,
            part: caps[2].to_string(),
            location: caps[3].to_string(),
        })
    }
}
