use integration_tests::harness::{CapturedEvent, init_test_tracing, run_fixture};
use tracing::Level;
use vsl_session_core::conf::ErrorPolicy;
use vsl_session_core::pipeline::RunOptions;

fn events_for(session_id: &str, message: &str) -> Vec<CapturedEvent> {
    init_test_tracing()
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.message() == Some(message) && e.field("session_id") == Some(session_id))
        .cloned()
        .collect()
}

/// Opening and closing a session are both traced with its id
#[test]
fn session_lifecycle_is_traced() {
    // Arrange
    init_test_tracing();

    // Act
    let run = run_fixture("varnishlog.log", &RunOptions::default());
    run.result.unwrap();

    // Assert
    assert_eq!(events_for("12", "session opened").len(), 1);

    let closed = events_for("13", "session closed");
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].level, Level::DEBUG);
    assert_eq!(closed[0].field("lines"), Some("15"));

    assert!(
        events_for("14", "session closed").is_empty(),
        "session 14 never closes"
    );
}

/// Skipped lines are reported as warnings carrying the offending input
#[test]
fn skipped_lines_are_warned() {
    // Arrange
    let events = init_test_tracing();
    let opts = RunOptions {
        on_error: ErrorPolicy::Skip,
        ..RunOptions::default()
    };

    // Act
    run_fixture("malformed_line.log", &opts).result.unwrap();

    // Assert
    let events = events.lock().unwrap();
    let warning = events
        .iter()
        .find(|e| {
            e.level == Level::WARN
                && e.message() == Some("skipping line")
                && e.field("error").is_some_and(|err| err.contains("/missing-marker"))
        })
        .expect("expected a skipping line warning");

    assert_eq!(warning.field("line_no"), Some("4"));
}
