//! Input file discovery.
//!
//! Patterns use shell wildcards in the file-name component only:
//! `/data/ww-kraken/*.vir.json`. `*` matches any run of characters and `?`
//! matches exactly one.

use crate::error::{Result, VirError};
use log::{debug, warn};
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name fragments marking control/blank runs that are never samples.
pub const DEFAULT_EXCLUDE: &[&str] = &["Undetermined"];

/// A compiled file pattern: a directory plus a file-name matcher.
#[derive(Debug, Clone)]
pub struct FilePattern {
    dir: PathBuf,
    name: Regex,
    hidden: bool,
    source: String,
}

impl FilePattern {
    /// Compile a pattern such as `data/ww-kraken/*.tid.json`.
    pub fn new<P: AsRef<Path>>(pattern: P) -> Result<Self> {
        let pattern = pattern.as_ref();
        let source = pattern.display().to_string();
        let invalid = |reason: &str| VirError::InvalidPattern {
            pattern: source.clone(),
            reason: reason.to_string(),
        };

        let file_part = pattern
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| invalid("no file-name component"))?;
        let dir = match pattern.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if dir.to_string_lossy().contains(['*', '?']) {
            return Err(invalid("wildcards are only supported in the file name"));
        }

        let mut expr = String::with_capacity(file_part.len() + 8);
        expr.push('^');
        for c in file_part.chars() {
            match c {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                _ => expr.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
            }
        }
        expr.push('$');
        let name = Regex::new(&expr).map_err(|e| invalid(&e.to_string()))?;

        let hidden = file_part.starts_with('.');

        Ok(Self {
            dir,
            name,
            hidden,
            source,
        })
    }

    /// Directory searched by the pattern.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a bare file name matches. Names starting with `.` only match
    /// a pattern that starts with `.` too.
    pub fn matches(&self, file_name: &str) -> bool {
        if file_name.starts_with('.') && !self.hidden {
            return false;
        }
        self.name.is_match(file_name)
    }

    /// The pattern as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// List regular files matching `pattern`, skipping names containing any
/// `exclude` fragment. Paths are returned sorted.
///
/// Symlinks are followed. Hidden files only match a pattern that itself
/// starts with `.`. A missing directory yields no files.
pub fn discover_files<S: AsRef<str>>(pattern: &FilePattern, exclude: &[S]) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(pattern.dir()) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Directory {} does not exist", pattern.dir().display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !pattern.matches(name) {
            continue;
        }
        if !entry.path().is_file() {
            continue;
        }
        if exclude.iter().any(|frag| name.contains(frag.as_ref())) {
            debug!("Skipping control run {}", name);
            continue;
        }
        files.push(entry.path());
    }
    files.sort();
    Ok(files)
}
