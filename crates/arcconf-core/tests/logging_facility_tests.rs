#![allow(clippy::unwrap_used, clippy::expect_used)]

use arcconf_core::errors::ConfError;
use arcconf_core::logging_facility::init_test_capture;
use arcconf_core::{log_op_end, log_op_error, log_op_start};
use arcconf_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, path = "dicomDeviceName=arc");

    let start_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_START))
        .collect();
    assert_eq!(start_events.len(), 1);
    assert_eq!(start_events[0].field("path"), Some("dicomDeviceName=arc"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42, ops_len = 3usize);

    let end_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
    assert_eq!(end_events[0].field("ops_len"), Some("3"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ConfError::NoSuchEntry {
        path: "dicomDeviceName=gone".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let error_event = capture
        .events_for_op(op_name)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event for this test");
    assert_eq!(error_event.level, tracing::Level::ERROR);
    assert_eq!(error_event.field("err_code"), Some("ERR_NO_SUCH_ENTRY"));
    assert_eq!(error_event.field("err_kind"), Some("NoSuchEntry"));
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();
    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}

#[test]
fn test_capture_count_events() {
    let capture = init_test_capture();
    let op1_name = "test_count_events_op1_unique_8";
    let op2_name = "test_count_events_op2_unique_8";

    log_op_start!(op1_name, path = "dicomDeviceName=a");
    log_op_start!(op2_name, path = "dicomDeviceName=b");
    log_op_end!(op1_name, duration_ms = 10, ops_len = 0usize);

    let ours = |e: &arcconf_core::logging_facility::CapturedEvent| {
        e.op.as_deref() == Some(op1_name) || e.op.as_deref() == Some(op2_name)
    };
    let start_count = capture.count_events(|e| ours(e) && e.event.as_deref() == Some(EVENT_START));
    let end_count = capture.count_events(|e| ours(e) && e.event.as_deref() == Some(EVENT_END));

    assert_eq!(start_count, 2);
    assert_eq!(end_count, 1);
}
