//! Per-sample classification output.

use crate::error::{Result, VirError};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One sample: a label plus its taxon abundances in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    sample_id: String,
    abundances: Vec<(String, f64)>,
}

impl SampleRecord {
    /// Create a record from a label and `(taxon, value)` pairs.
    pub fn new(sample_id: impl Into<String>, abundances: Vec<(String, f64)>) -> Self {
        Self {
            sample_id: sample_id.into(),
            abundances,
        }
    }

    /// Parse a flat JSON object `{ taxon: number | null }`.
    ///
    /// Key order is preserved. `null` (how missing values are serialized by
    /// the classifier's post-processing) becomes zero.
    pub fn from_json_reader<R: Read>(
        sample_id: impl Into<String>,
        reader: R,
        origin: &str,
    ) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader).map_err(|source| VirError::SampleJson {
            path: origin.to_string(),
            source,
        })?;
        let object = match value {
            Value::Object(map) => map,
            other => {
                return Err(VirError::InvalidValue {
                    path: origin.to_string(),
                    taxon: String::new(),
                    value: format!("expected a JSON object, found {}", json_kind(&other)),
                })
            }
        };

        let mut abundances = Vec::with_capacity(object.len());
        for (taxon, value) in object {
            let amount = match &value {
                Value::Null => 0.0,
                Value::Number(n) => n.as_f64().ok_or_else(|| VirError::InvalidValue {
                    path: origin.to_string(),
                    taxon: taxon.clone(),
                    value: n.to_string(),
                })?,
                other => {
                    return Err(VirError::InvalidValue {
                        path: origin.to_string(),
                        taxon,
                        value: other.to_string(),
                    })
                }
            };
            if amount < 0.0 {
                return Err(VirError::InvalidValue {
                    path: origin.to_string(),
                    taxon,
                    value: amount.to_string(),
                });
            }
            abundances.push((taxon, amount));
        }

        Ok(Self::new(sample_id, abundances))
    }

    /// Read and parse a sample file.
    pub fn from_json_file<P: AsRef<Path>>(sample_id: impl Into<String>, path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_json_reader(sample_id, BufReader::new(file), &path.display().to_string())
    }

    /// Sample label.
    #[inline]
    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    /// Taxon abundances in file order.
    #[inline]
    pub fn abundances(&self) -> &[(String, f64)] {
        &self.abundances
    }

    /// Number of taxa reported for this sample.
    #[inline]
    pub fn n_taxa(&self) -> usize {
        self.abundances.len()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order() {
        let json = r#"{"zeta": 3, "alpha": 1.5, "mid": 0}"#;
        let record = SampleRecord::from_json_reader("S1", json.as_bytes(), "test").unwrap();
        let taxa: Vec<&str> = record.abundances().iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(taxa, vec!["zeta", "alpha", "mid"]);
        assert_eq!(record.abundances()[1].1, 1.5);
        assert_eq!(record.sample_id(), "S1");
    }

    #[test]
    fn test_null_is_zero() {
        let json = r#"{"a": null, "b": 2}"#;
        let record = SampleRecord::from_json_reader("S1", json.as_bytes(), "test").unwrap();
        assert_eq!(record.abundances()[0], ("a".to_string(), 0.0));
    }

    #[test]
    fn test_rejects_non_numeric() {
        let json = r#"{"a": "many"}"#;
        let result = SampleRecord::from_json_reader("S1", json.as_bytes(), "x.json");
        assert!(matches!(result, Err(VirError::InvalidValue { taxon, .. }) if taxon == "a"));
    }

    #[test]
    fn test_rejects_negative() {
        let json = r#"{"a": -1}"#;
        assert!(SampleRecord::from_json_reader("S1", json.as_bytes(), "x.json").is_err());
    }

    #[test]
    fn test_rejects_non_object() {
        let json = "[1, 2, 3]";
        assert!(SampleRecord::from_json_reader("S1", json.as_bytes(), "x.json").is_err());
    }

    #[test]
    fn test_malformed_json_names_file() {
        let result = SampleRecord::from_json_reader("S1", "{".as_bytes(), "broken.json");
        match result {
            Err(VirError::SampleJson { path, .. }) => assert_eq!(path, "broken.json"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
