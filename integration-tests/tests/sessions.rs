use integration_tests::harness::run_fixture;
use pretty_assertions::assert_eq;
use vsl_session_core::conf::ErrorPolicy;
use vsl_session_core::grammar::BackendLines;
use vsl_session_core::pipeline::RunOptions;
use vsl_session_core::{PipelineError, SessionId};

/// The reference transcript reassembles into one complete session
#[test]
fn example_transcript_reassembles() {
    // Act
    let run = run_fixture("example.log", &RunOptions::default());

    // Assert
    let summary = run.result.unwrap();
    assert_eq!(summary.lines, 7);
    assert_eq!(summary.finished, 1);
    assert_eq!(run.delivered.len(), 1);

    let json = serde_json::to_value(&run.delivered[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": 1,
            "fields": {
                "ip": "10.0.0.1",
                "method": "GET",
                "url": "/index.html",
                "protocol": "HTTP/1.1",
                "status": "200",
                "headers": { "Host": "example.com" },
            },
            "raw_history": [
                "SessionOpen 10.0.0.1 80 10.0.0.2:443",
                "RxRequest GET",
                "RxURL /index.html",
                "RxProtocol HTTP/1.1",
                "RxHeader Host: example.com",
                "TxStatus 200",
                "SessionClose -",
            ],
        })
    );
}

/// Interleaved varnishlog output produces independent sessions
#[test]
fn interleaved_varnishlog_output() {
    // Act
    let run = run_fixture("varnishlog.log", &RunOptions::default());

    // Assert
    let summary = run.result.unwrap();
    assert_eq!(summary.finished, 2);
    assert_eq!(summary.open, 1);

    let ids: Vec<_> = run.delivered.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![SessionId(12), SessionId(13)]);

    let css = &run.delivered[0];
    assert_eq!(css.fields.ip.as_deref(), Some("192.168.1.10"));
    assert_eq!(css.fields.url.as_deref(), Some("/assets/app.css"));
    assert_eq!(css.fields.status.as_deref(), Some("200"));
    assert_eq!(css.fields.header("Accept"), Some("*/*"));
    assert_eq!(css.fields.headers.as_ref().unwrap().len(), 3);
    assert_eq!(css.raw_history.len(), 20);
    assert_eq!(css.raw_history.last().unwrap(), "SessionClose EOF");

    let api = &run.delivered[1];
    assert_eq!(api.fields.method.as_deref(), Some("POST"));
    assert_eq!(api.fields.url.as_deref(), Some("/api/orders?id=17"));
    assert_eq!(api.fields.protocol.as_deref(), Some("HTTP/1.0"));
    assert_eq!(api.fields.status.as_deref(), Some("503"));
    assert_eq!(
        api.fields.header("Content-Type"),
        Some("application/json; charset=utf-8")
    );

    assert_eq!(run.still_open.len(), 1);
    let slow = &run.still_open[0];
    assert_eq!(slow.id(), SessionId(14));
    assert_eq!(slow.fields().url.as_deref(), Some("/slow"));
}

/// A header without a colon aborts the run after earlier sessions were delivered
#[test]
fn bad_header_aborts_run() {
    // Act
    let run = run_fixture("bad_header.log", &RunOptions::default());

    // Assert
    match run.result {
        Err(PipelineError::InvalidPayload(e)) => {
            assert_eq!(e.tag, "RxHeader");
            assert_eq!(e.payload, "X-Broken-Header");
        }
        other => panic!("expected invalid payload, got {other:?}"),
    }
    assert_eq!(run.delivered.len(), 1);
    assert_eq!(run.delivered[0].id, SessionId(5));

    // Session 6 keeps everything up to and including the failing line.
    assert_eq!(run.still_open.len(), 1);
    assert_eq!(
        run.still_open[0].raw_history(),
        &[
            "SessionOpen 172.16.0.6 1234 :80".to_string(),
            "RxHeader X-Broken-Header".to_string(),
        ]
    );
}

/// A line without the direction marker aborts and leaves no trace in the table
#[test]
fn malformed_line_aborts_run() {
    let run = run_fixture("malformed_line.log", &RunOptions::default());

    match run.result {
        Err(PipelineError::MalformedLine(e)) => assert_eq!(e.line, "22 RxURL /missing-marker"),
        other => panic!("expected malformed line, got {other:?}"),
    }
    assert_eq!(run.delivered.len(), 1);
    assert!(run.still_open.is_empty());
}

/// Skip policy reports violations but keeps going
#[test]
fn skip_policy_finishes_the_file() {
    let opts = RunOptions {
        on_error: ErrorPolicy::Skip,
        ..RunOptions::default()
    };

    let run = run_fixture("bad_header.log", &opts);

    let summary = run.result.unwrap();
    assert_eq!(summary.skipped, 1);
    let ids: Vec<_> = run.delivered.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![SessionId(5), SessionId(6), SessionId(7)]);
}

/// Backend records are rejected by default and dropped on request
#[test]
fn backend_records() {
    let strict = run_fixture("mixed_direction.log", &RunOptions::default());
    assert!(matches!(strict.result, Err(PipelineError::MalformedLine(_))));

    let lenient = run_fixture(
        "mixed_direction.log",
        &RunOptions {
            backend_lines: BackendLines::Skip,
            ..RunOptions::default()
        },
    );

    let summary = lenient.result.unwrap();
    assert_eq!(summary.backend_skipped, 2);
    assert_eq!(lenient.delivered.len(), 1);
    assert_eq!(
        lenient.delivered[0].raw_history,
        vec![
            "SessionOpen 172.16.0.31 1234 :80",
            "RxURL /client",
            "SessionClose -",
        ]
    );
}
