mod common;

use std::fs;
use std::sync::Arc;

use common::{cols, recording_tracker, FailingEmitter};
use frame_lineage::error::InstrumentError;
use frame_lineage::lineage::event::EventType;
use frame_lineage::lineage::HandleToken;
use frame_lineage::{LineageConfig, LineageSession, RunTracker, Table};

#[test]
fn read_and_write_are_tracked_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "a,b\n1,2\n3,4\n").unwrap();

    let (tracker, emitter) = recording_tracker();
    let session = LineageSession::new(Arc::new(tracker));

    let table = session.read_csv(&input).unwrap();
    assert_eq!(table.columns(), &cols(&["a", "b"])[..]);
    assert_eq!(table.len(), 2);

    session.write_csv(&table, &output).unwrap();
    assert_eq!(fs::read_to_string(&output).unwrap(), "a,b\n1,2\n3,4\n");

    let report = session.shutdown_guard().finish().unwrap();
    assert_eq!(report.inputs, 1);
    assert_eq!(report.outputs, 1);

    let events = emitter.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type, EventType::Start);
    assert_eq!(events[1].event_type, EventType::Complete);

    let complete = &events[1];
    assert_eq!(complete.inputs[0].namespace, "file://");
    assert_eq!(complete.inputs[0].name, input.display().to_string());
    assert_eq!(complete.outputs[0].name, output.display().to_string());
    assert_eq!(complete.outputs[0].field_names(), vec!["a", "b"]);
}

#[test]
fn job_name_comes_from_calling_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    fs::write(&input, "x\n1\n").unwrap();

    let (tracker, emitter) = recording_tracker();
    let session = LineageSession::new(Arc::new(tracker));
    session.read_csv(&input).unwrap();

    let job_name = session.tracker().job_name().unwrap();
    assert!(
        job_name.ends_with("instrumented_io.rs"),
        "Job name should be this test file, got {}",
        job_name
    );
    assert_eq!(emitter.events()[0].job.name, job_name);
}

#[test]
fn empty_path_is_a_usage_error_and_records_nothing() {
    let (tracker, emitter) = recording_tracker();
    let session = LineageSession::new(Arc::new(tracker));

    let err = session.read_csv("").unwrap_err();
    assert!(matches!(
        err,
        InstrumentError::MissingPath { operation: "read_csv", .. }
    ));

    let err = session
        .observe_write(HandleToken::mint(), "  ", cols(&["a"]))
        .unwrap_err();
    assert!(matches!(err, InstrumentError::MissingPath { .. }));

    assert_eq!(session.tracker().input_count(), 0);
    assert_eq!(session.tracker().output_count(), 0);
    assert!(emitter.events().is_empty());
}

#[test]
fn missing_file_surfaces_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let (tracker, _) = recording_tracker();
    let session = LineageSession::new(Arc::new(tracker));

    let result = session.read_csv(dir.path().join("absent.csv"));
    assert!(result.is_err());
    assert_eq!(session.tracker().input_count(), 0);
}

#[test]
fn unreachable_collector_never_fails_io() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "a\n1\n").unwrap();

    let emitter = Arc::new(FailingEmitter::default());
    let tracker = RunTracker::new(&LineageConfig::default(), Box::new(Arc::clone(&emitter)));
    let session = LineageSession::new(Arc::new(tracker));

    let table = session.read_csv(&input).unwrap();
    session.write_csv(&table, &output).unwrap();
    let again = session.read_csv(&input).unwrap();
    assert_eq!(again.len(), 1);

    // One START attempt, then nothing until shutdown.
    assert_eq!(emitter.attempts(), 1);
    drop(session.shutdown_guard());
    assert_eq!(emitter.attempts(), 2);
    assert!(session.tracker().is_finalized());
}

#[test]
fn dropping_the_guard_finalizes_once() {
    let (tracker, emitter) = recording_tracker();
    let session = LineageSession::new(Arc::new(tracker));
    session
        .observe_read(HandleToken::mint(), "s3://lake/raw/events.csv", cols(&["ts"]))
        .unwrap();

    {
        let _guard = session.shutdown_guard();
    }
    // A second guard finds the run already finalized and only logs.
    drop(session.shutdown_guard());

    assert_eq!(emitter.count(EventType::Complete), 1);
    let complete = emitter.events().pop().unwrap();
    assert_eq!(complete.inputs[0].namespace, "s3://lake");
    assert_eq!(complete.inputs[0].name, "raw/events.csv");
}

#[test]
fn rereading_a_file_yields_a_new_dataset_handle() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    fs::write(&input, "a\n1\n").unwrap();

    let (tracker, _) = recording_tracker();
    let session = LineageSession::new(Arc::new(tracker));
    let first = session.read_csv(&input).unwrap();
    let second = session.read_csv(&input).unwrap();

    assert_ne!(first.handle(), second.handle());
    assert_eq!(session.tracker().input_count(), 2);
}

#[test]
fn writing_a_derived_table_tracks_its_own_handle() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("derived.csv");

    let (tracker, _) = recording_tracker();
    let session = LineageSession::new(Arc::new(tracker));

    let mut table = Table::empty(cols(&["k", "v"]));
    table.push_row(cols(&["a", "1"])).unwrap();
    session.on_transform(&table);
    session.write_csv(&table, &output).unwrap();
    session.write_csv(&table, &output).unwrap();

    assert_eq!(session.tracker().output_count(), 1);
    assert!(session.tracker().is_start_emitted());
}

#[test]
fn host_observed_objects_never_merge_with_tables() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    fs::write(&input, "a\n1\n").unwrap();

    let (tracker, emitter) = recording_tracker();
    let session = LineageSession::new(Arc::new(tracker));

    let host_handle = HandleToken::mint();
    session
        .observe_read(host_handle, "/host/owned.csv", cols(&["a"]))
        .unwrap();
    let table = session.read_csv(&input).unwrap();
    assert_ne!(table.handle(), host_handle);
    assert_eq!(session.tracker().input_count(), 2);

    session.shutdown_guard().finish().unwrap();
    let events = emitter.events();
    let table_path = input.display().to_string();
    let names: Vec<&str> = events[1].inputs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["/host/owned.csv", table_path.as_str()]);
}
