//! Integration tests for file-backed log sets.
//!
//! Every test writes into its own temporary directory.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::fs;
use std::path::{Path, PathBuf};

use aerolog_sink::LogSet;
use aerolog_types::{ConflictRecord, DepartureRecord, EntityId, LogKind, SeparationRecord};

fn log_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries.map(|e| e.unwrap().path()).collect();
    files.sort();
    files
}

fn file_for(dir: &Path, kind: LogKind) -> PathBuf {
    log_files(dir)
        .into_iter()
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&format!("{}_", kind.name())))
        })
        .expect("log file exists")
}

fn data_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

#[test]
fn disabled_file_logs_create_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let mut logs = LogSet::files(&out);

    let written = logs
        .write(&ConflictRecord {
            first: EntityId::from("A"),
            second: EntityId::from("B"),
        })
        .unwrap();

    assert!(!written);
    assert!(log_files(&out).is_empty());
}

#[test]
fn enabled_file_logs_write_header_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let mut logs = LogSet::files(&out);
    for kind in LogKind::ALL {
        logs.enable(kind).unwrap();
    }

    logs.set_sim_time(12.5);
    logs.write(&DepartureRecord {
        id: EntityId::from("KL204"),
        distance_flown_m: 1500.0,
        remaining_m: Some(250.25),
    })
    .unwrap();
    logs.write(&DepartureRecord {
        id: EntityId::from("KL205"),
        distance_flown_m: 10.0,
        remaining_m: None,
    })
    .unwrap();
    logs.write(&ConflictRecord {
        first: EntityId::from("A"),
        second: EntityId::from("B"),
    })
    .unwrap();
    logs.write(&SeparationRecord {
        first: EntityId::from("A"),
        second: EntityId::from("B"),
        distance_m: 30.0,
    })
    .unwrap();
    logs.flush_all().unwrap();

    assert_eq!(log_files(&out).len(), 3);

    let uav = file_for(&out, LogKind::Uav);
    let contents = fs::read_to_string(&uav).unwrap();
    assert!(contents.starts_with("# UAV LOG"));
    assert_eq!(
        data_lines(&uav),
        ["12.50, KL204, 1500.000, 250.250", "12.50, KL205, 10.000"]
    );
    assert_eq!(
        data_lines(&file_for(&out, LogKind::Conflict)),
        ["12.50, A, B"]
    );
    assert_eq!(
        data_lines(&file_for(&out, LogKind::LossOfSeparation)),
        ["12.50, A, B, 30.000"]
    );
}

#[test]
fn disabling_stops_recording_and_flushes() {
    let dir = tempfile::tempdir().unwrap();
    let mut logs = LogSet::files(dir.path());
    logs.enable(LogKind::Conflict).unwrap();

    logs.set_sim_time(1.0);
    logs.write(&ConflictRecord {
        first: EntityId::from("A"),
        second: EntityId::from("B"),
    })
    .unwrap();
    logs.disable(LogKind::Conflict).unwrap();

    let dropped = logs
        .write(&ConflictRecord {
            first: EntityId::from("C"),
            second: EntityId::from("D"),
        })
        .unwrap();
    assert!(!dropped);

    let path = file_for(dir.path(), LogKind::Conflict);
    assert_eq!(data_lines(&path), ["1.00, A, B"]);
}

#[test]
fn dropping_the_set_flushes_pending_rows() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut logs = LogSet::files(dir.path());
        logs.enable(LogKind::LossOfSeparation).unwrap();
        logs.set_sim_time(3.0);
        logs.write(&SeparationRecord {
            first: EntityId::from("A"),
            second: EntityId::from("B"),
            distance_m: 5.0,
        })
        .unwrap();
    }
    let path = file_for(dir.path(), LogKind::LossOfSeparation);
    assert_eq!(data_lines(&path), ["3.00, A, B, 5.000"]);
}
