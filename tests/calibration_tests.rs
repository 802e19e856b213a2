//! Integration tests for Calibrator

mod common;
use common::*;

use panel_countdown::colors;
use panel_countdown::{
    CALIBRATION_STEP_DELAY, CalibrationError, Calibrator, CandidateOrder, CredentialStore,
    MemoryStore, PanelCommand, PanelId,
};
use std::collections::BTreeSet;
use std::time::Duration;

fn candidate(s: &str) -> CandidateOrder {
    CandidateOrder::parse(s).unwrap()
}

fn ids(ids: &[u16]) -> BTreeSet<PanelId> {
    ids.iter().copied().map(PanelId).collect()
}

#[test]
fn permutation_is_swept_and_saved() {
    let log = event_log();
    let stored = config(&[1, 2, 3]);
    let mut store = MemoryStore::new(Some(stored.clone()));
    let mut calibrator = Calibrator::new(RecordingSink::new(&log), RecordingPacer::new(&log));

    let updated = calibrator
        .calibrate(&mut store, &stored, &candidate("3,1,2"))
        .unwrap();

    assert_eq!(updated.panel_order, order(&[3, 1, 2]));
    assert_eq!(updated.credentials, stored.credentials);
    assert_eq!(store.saves(), 1);
    assert_eq!(store.load().unwrap(), Some(updated));
}

#[test]
fn sweep_ramps_red_with_position() {
    let log = event_log();
    let stored = config(&[1, 2, 3]);
    let mut store = MemoryStore::new(Some(stored.clone()));
    let mut calibrator = Calibrator::new(RecordingSink::new(&log), RecordingPacer::new(&log));
    calibrator
        .calibrate(&mut store, &stored, &candidate("3,1,2"))
        .unwrap();

    assert_eq!(
        sent(&log),
        vec![
            PanelCommand::instant(PanelId(3), colors::marker(85)),
            PanelCommand::instant(PanelId(1), colors::marker(170)),
            PanelCommand::instant(PanelId(2), colors::marker(255)),
        ]
    );
    assert_eq!(pauses(&log), vec![CALIBRATION_STEP_DELAY; 3]);
    assert_eq!(CALIBRATION_STEP_DELAY, Duration::from_millis(200));
}

#[test]
fn each_panel_is_held_before_the_next_lights() {
    let log = event_log();
    let mut calibrator = Calibrator::new(RecordingSink::new(&log), RecordingPacer::new(&log))
        .with_step_delay(Duration::from_millis(500));
    calibrator.sweep(&order(&[4, 5])).unwrap();

    let events = log.borrow();
    assert!(matches!(events[0], Event::Sent(c) if c.panel == PanelId(4)));
    assert_eq!(events[1], Event::Paused(Duration::from_millis(500)));
    assert!(matches!(events[2], Event::Sent(c) if c.panel == PanelId(5)));
    assert_eq!(events[3], Event::Paused(Duration::from_millis(500)));
}

#[test]
fn marker_uses_truncated_step_for_uneven_counts() {
    let log = event_log();
    let mut calibrator = Calibrator::new(RecordingSink::new(&log), RecordingPacer::new(&log));
    calibrator.sweep(&order(&[1, 2, 3, 4, 5, 6, 7])).unwrap();

    let reds: Vec<u8> = sent(&log).iter().map(|c| c.levels.rgb.red).collect();
    assert_eq!(reds, vec![36, 72, 108, 144, 180, 216, 252]);
    assert!(sent(&log).iter().all(|c| c.levels.white == 1 && c.transition.is_zero()));
}

#[test]
fn missing_panel_is_rejected_without_lighting_anything() {
    let log = event_log();
    let stored = config(&[1, 2, 3]);
    let mut store = MemoryStore::new(Some(stored.clone()));
    let mut calibrator = Calibrator::new(RecordingSink::new(&log), RecordingPacer::new(&log));

    let err = calibrator
        .calibrate(&mut store, &stored, &candidate("1,2"))
        .unwrap_err();

    match err {
        CalibrationError::Validation(mismatch) => {
            assert_eq!(mismatch.missing, ids(&[3]));
            assert!(mismatch.extra.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(log.borrow().is_empty());
    assert_eq!(store.saves(), 0);
}

#[test]
fn duplicate_panel_is_rejected_without_lighting_anything() {
    let log = event_log();
    let stored = config(&[1, 2, 3]);
    let mut store = MemoryStore::new(Some(stored.clone()));
    let mut calibrator = Calibrator::new(RecordingSink::new(&log), RecordingPacer::new(&log));

    let err = calibrator
        .calibrate(&mut store, &stored, &candidate("1,2,3,2"))
        .unwrap_err();

    assert!(matches!(
        err,
        CalibrationError::Validation(ref m) if m.duplicates == ids(&[2])
    ));
    assert!(sent(&log).is_empty());
    assert_eq!(store.saves(), 0);
}

#[test]
fn unknown_panel_is_rejected() {
    let log = event_log();
    let stored = config(&[1, 2, 3]);
    let mut store = MemoryStore::new(Some(stored.clone()));
    let mut calibrator = Calibrator::new(RecordingSink::new(&log), RecordingPacer::new(&log));

    let err = calibrator
        .calibrate(&mut store, &stored, &candidate("1,2,3,44"))
        .unwrap_err();

    assert!(matches!(
        err,
        CalibrationError::Validation(ref m) if m.extra == ids(&[44]) && m.missing.is_empty()
    ));
    assert!(sent(&log).is_empty());
}

#[test]
fn transport_failure_keeps_the_stored_order() {
    let log = event_log();
    let stored = config(&[1, 2, 3]);
    let mut store = MemoryStore::new(Some(stored.clone()));
    let mut calibrator =
        Calibrator::new(RecordingSink::failing_at(&log, 2), RecordingPacer::new(&log));

    let err = calibrator
        .calibrate(&mut store, &stored, &candidate("2,3,1"))
        .unwrap_err();

    assert!(matches!(
        err,
        CalibrationError::Transport {
            panel: PanelId(1),
            ..
        }
    ));
    assert_eq!(sent(&log).len(), 2);
    assert_eq!(store.saves(), 0);
    assert_eq!(store.load().unwrap(), Some(stored));
}

#[test]
fn interrupted_sweep_keeps_the_stored_order() {
    let log = event_log();
    let stored = config(&[1, 2, 3]);
    let mut store = MemoryStore::new(Some(stored.clone()));
    let mut calibrator =
        Calibrator::new(RecordingSink::new(&log), RecordingPacer::interrupting_at(&log, 0));

    let err = calibrator
        .calibrate(&mut store, &stored, &candidate("3,2,1"))
        .unwrap_err();

    assert!(matches!(err, CalibrationError::Interrupted));
    assert_eq!(sent(&log).len(), 1);
    assert_eq!(store.saves(), 0);
}

#[test]
fn preview_sweep_does_not_touch_the_store() {
    let log = event_log();
    let stored = config(&[9, 8]);
    let store = MemoryStore::new(Some(stored.clone()));
    let mut calibrator = Calibrator::new(RecordingSink::new(&log), RecordingPacer::new(&log));

    calibrator.sweep(&stored.panel_order).unwrap();

    assert_eq!(sent(&log).len(), 2);
    assert_eq!(store.saves(), 0);
}

#[test]
fn validation_message_names_the_missing_ids() {
    let stored = config(&[1, 2, 3]);
    let mut store = MemoryStore::new(Some(stored.clone()));
    let log = event_log();
    let mut calibrator = Calibrator::new(RecordingSink::new(&log), RecordingPacer::new(&log));

    let err = calibrator
        .calibrate(&mut store, &stored, &candidate("2"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "candidate order does not match the device's panels; missing {1, 3}"
    );
}
