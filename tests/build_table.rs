//! Integration tests for building abundance tables from sample files.

use approx::assert_relative_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use ww_virome::prelude::*;

/// Write one JSON sample file per `(name, json)` pair.
fn write_samples(dir: &Path, samples: &[(&str, &str)]) {
    for (name, json) in samples {
        fs::write(dir.join(name), json).unwrap();
    }
}

fn scenario_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_samples(
        dir.path(),
        &[
            ("A.json", r#"{"sp1": 4, "sp2": 1}"#),
            ("B.json", r#"{"sp1": 2}"#),
            ("C.json", r#"{"sp2": 5}"#),
        ],
    );
    dir
}

fn file_builder(options: LoadOptions) -> AbundanceTableBuilder {
    AbundanceTableBuilder::new(CleanFileName::default()).with_options(options)
}

#[test]
fn test_worked_scenario() {
    let dir = scenario_dir();
    let table = file_builder(LoadOptions::default().expected_files(3))
        .load(dir.path().join("*.json"))
        .unwrap();

    assert_eq!(table.sample_ids(), &["A", "B", "C"]);
    // sp1 and sp2 both total 6; sp1 is encountered first
    assert_eq!(table.taxon_ids(), &["sp1", "sp2"]);
    assert_relative_eq!(table.get(0, 0), 0.8, epsilon = 1e-12);
    assert_relative_eq!(table.get(0, 1), 0.2, epsilon = 1e-12);
    assert_eq!(table.row(1), vec![1.0, 0.0]);
    assert_eq!(table.row(2), vec![0.0, 1.0]);
}

#[test]
fn test_completeness() {
    let dir = TempDir::new().unwrap();
    write_samples(
        dir.path(),
        &[
            ("s1.vir.json", r#"{"a": 1, "b": null}"#),
            ("s2.vir.json", r#"{"c": 2}"#),
            ("s3.vir.json", r#"{"d": 3, "a": 1}"#),
            ("notes.txt", "not a sample"),
        ],
    );
    let table = file_builder(LoadOptions::default().normalize(false))
        .load(dir.path().join("*.vir.json"))
        .unwrap();

    assert_eq!(table.sample_ids(), &["s1", "s2", "s3"]);
    assert_eq!(table.n_taxa(), 4);
    for taxon in ["a", "b", "c", "d"] {
        assert!(table.contains_taxon(taxon), "missing {}", taxon);
    }
    assert!(table.data().iter().all(|v| v.is_finite()));
    assert_eq!(table.get_by_label("s2", "a"), Some(0.0));
    assert_eq!(table.get_by_label("s1", "b"), Some(0.0));
    assert_eq!(table.get_by_label("s3", "d"), Some(3.0));
}

#[test]
fn test_column_order_is_reproducible() {
    let dir = TempDir::new().unwrap();
    write_samples(
        dir.path(),
        &[
            ("x1.json", r#"{"t3": 1, "t1": 1, "t2": 1}"#),
            ("x2.json", r#"{"t4": 1, "t2": 1}"#),
            ("x3.json", r#"{"t1": 1, "t5": 2}"#),
        ],
    );
    let builder = file_builder(LoadOptions::default());
    let first = builder.load(dir.path().join("*.json")).unwrap();
    for _ in 0..5 {
        let again = builder.load(dir.path().join("*.json")).unwrap();
        assert_eq!(again.taxon_ids(), first.taxon_ids());
    }
    // t1 and t2 total 2, t5 totals 2; t3 and t4 total 1
    assert_eq!(first.taxon_ids(), &["t1", "t2", "t5", "t3", "t4"]);
}

#[test]
fn test_normalized_rows_sum_to_one() {
    let dir = TempDir::new().unwrap();
    write_samples(
        dir.path(),
        &[
            ("a.json", r#"{"x": 0.1, "y": 0.7, "z": 0.05}"#),
            ("b.json", r#"{"x": 13, "z": 1029}"#),
            ("c.json", r#"{"x": 0, "y": 0}"#),
        ],
    );
    let table = file_builder(LoadOptions::default())
        .load(dir.path().join("*.json"))
        .unwrap();

    let sums = table.row_sums();
    assert_relative_eq!(sums[0], 1.0, epsilon = 1e-9);
    assert_relative_eq!(sums[1], 1.0, epsilon = 1e-9);
    // All-zero sample stays all-zero
    assert_eq!(table.row(2), vec![0.0, 0.0, 0.0]);
}

#[test]
fn test_spike_fold_into_residual() {
    let dir = TempDir::new().unwrap();
    write_samples(
        dir.path(),
        &[
            (
                "s1.json",
                r#"{"unclassified": 10, "Betacoronavirus 1": 3, "NC_001405": 2, "Norovirus GII": 7}"#,
            ),
            ("s2.json", r#"{"unclassified": 1, "Human mastadenovirus F": 4}"#),
        ],
    );
    let options = LoadOptions::default()
        .normalize(false)
        .spike(SpikeHandling::FoldInto("unclassified".into()));
    let report = file_builder(options)
        .load_with_report(dir.path().join("*.json"))
        .unwrap();
    let table = &report.table;

    assert_eq!(table.get_by_label("s1", "unclassified"), Some(15.0));
    assert_eq!(table.get_by_label("s2", "unclassified"), Some(5.0));
    for spike in ["Betacoronavirus 1", "NC_001405", "Human mastadenovirus F"] {
        assert!(!table.contains_taxon(spike));
    }
    assert!(table.contains_taxon("Norovirus GII"));
    assert_eq!(report.spike.removed.len(), 3);
}

#[test]
fn test_spike_drop_then_normalize() {
    let dir = TempDir::new().unwrap();
    write_samples(
        dir.path(),
        &[("s1.json", r#"{"694003": 50, "12345": 25, "999": 25}"#)],
    );
    let table = file_builder(LoadOptions::default().spike(SpikeHandling::Drop))
        .load(dir.path().join("*.json"))
        .unwrap();
    assert_eq!(table.taxon_ids(), &["12345", "999"]);
    assert_eq!(table.row(0), vec![0.5, 0.5]);
}

#[test]
fn test_phylum_aggregation() {
    let dir = TempDir::new().unwrap();
    write_samples(
        dir.path(),
        &[(
            "s1.phy.json",
            r#"{"speciesA,phylumX": 1, "speciesB,phylumX": 2, "speciesC,phylumY": 3}"#,
        )],
    );
    let table = file_builder(LoadOptions::default().normalize(false).phylum_mode(true))
        .load(dir.path().join("*.phy.json"))
        .unwrap();
    assert_eq!(table.n_taxa(), 2);
    assert_eq!(table.get_by_label("s1.phy", "phylumX"), Some(3.0));
    assert_eq!(table.get_by_label("s1.phy", "phylumY"), Some(3.0));
}

#[test]
fn test_file_count_guard() {
    let dir = scenario_dir();
    let result = file_builder(LoadOptions::default().expected_files(4)).load(dir.path().join("*.json"));
    match result {
        Err(err @ VirError::FileCountMismatch { .. }) => {
            let message = err.to_string();
            assert!(message.contains('4'), "{}", message);
            assert!(message.contains('3'), "{}", message);
        }
        other => panic!("expected a file-count error, got {:?}", other),
    }
}

#[test]
fn test_control_runs_are_not_counted() {
    let dir = scenario_dir();
    write_samples(dir.path(), &[("Undetermined_S0.json", r#"{"sp9": 100}"#)]);
    let table = file_builder(LoadOptions::default().expected_files(3))
        .load(dir.path().join("*.json"))
        .unwrap();
    assert!(!table.contains_taxon("sp9"));
}

#[cfg(unix)]
#[test]
fn test_symlinked_sample_is_counted() {
    let elsewhere = TempDir::new().unwrap();
    write_samples(elsewhere.path(), &[("B.json", r#"{"sp1": 2}"#)]);
    let dir = TempDir::new().unwrap();
    write_samples(dir.path(), &[("A.json", r#"{"sp1": 4, "sp2": 1}"#)]);
    std::os::unix::fs::symlink(elsewhere.path().join("B.json"), dir.path().join("B.json")).unwrap();

    let table = file_builder(LoadOptions::default().expected_files(2))
        .load(dir.path().join("*.json"))
        .unwrap();
    assert_eq!(table.sample_ids(), &["A", "B"]);
}

#[test]
fn test_hidden_sidecar_files_are_not_samples() {
    let dir = TempDir::new().unwrap();
    write_samples(dir.path(), &[("A.json", r#"{"sp1": 4}"#)]);
    fs::write(dir.path().join("._A.json"), [0u8, 5, 22, 7, 0, 2]).unwrap();

    let table = file_builder(LoadOptions::default().expected_files(1))
        .load(dir.path().join("*.json"))
        .unwrap();
    assert_eq!(table.sample_ids(), &["A"]);
}

#[test]
fn test_missing_data_directory_reports_counts() {
    let dir = TempDir::new().unwrap();
    let result = file_builder(LoadOptions::survey()).load(dir.path().join("ww-kraken/*.vir.json"));
    match result {
        Err(err @ VirError::FileCountMismatch { .. }) => {
            let message = err.to_string();
            assert!(message.contains("36"), "{}", message);
            assert!(message.contains('0'), "{}", message);
        }
        other => panic!("expected a file-count error, got {:?}", other),
    }
}

#[test]
fn test_no_matching_files() {
    let dir = TempDir::new().unwrap();
    let result = file_builder(LoadOptions::default()).load(dir.path().join("*.json"));
    assert!(matches!(result, Err(VirError::EmptyData(_))));
}

#[test]
fn test_batch_drops_empty_samples() {
    let dir = TempDir::new().unwrap();
    write_samples(
        dir.path(),
        &[
            ("p1.vir.json", r#"{"a": 2, "b": 2}"#),
            ("p2.vir.json", r#"{}"#),
            ("p3.gen.json", r#"{"a": 0}"#),
        ],
    );
    let table = load_batch_data(dir.path().join("*.json"), SpikeHandling::Keep, 3, true, false).unwrap();
    assert_eq!(table.sample_ids(), &["p1"]);
    assert_eq!(table.row(0), vec![0.5, 0.5]);
}

#[test]
fn test_survey_naming() {
    let dir = TempDir::new().unwrap();
    write_samples(
        dir.path(),
        &[
            ("Inh_Wod_041522_S5_L001.tid.json", r#"{"10239": 4}"#),
            ("A1_S17_L001.tid.json", r#"{"10239": 1}"#),
        ],
    );
    let table = load_data(dir.path().join("*.tid.json"), SpikeHandling::Drop, 2, true, false).unwrap();
    assert_eq!(table.sample_ids(), &["1.Inh_Wod_041522", "2.Euro_Tur_111622"]);
    assert_eq!(
        sample_group(&table.sample_ids()[1]),
        Some(SurveyGroup::V2Solid)
    );
}

#[test]
fn test_malformed_sample_file() {
    let dir = TempDir::new().unwrap();
    write_samples(dir.path(), &[("ok.json", r#"{"a": 1}"#), ("bad.json", "{\"a\": ")]);
    let result = file_builder(LoadOptions::default()).load(dir.path().join("*.json"));
    assert!(matches!(result, Err(VirError::SampleJson { .. })));
}

#[test]
fn test_export_roundtrip_through_csv() {
    let dir = scenario_dir();
    let table = file_builder(LoadOptions::default())
        .load(dir.path().join("*.json"))
        .unwrap();
    let out = dir.path().join("data.csv");
    table.to_csv(&out).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "name,sp1,sp2");
    assert_eq!(lines[2], "B,1,0");
}
