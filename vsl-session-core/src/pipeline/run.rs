use crate::conf::ErrorPolicy;
use crate::error::PipelineError;
use crate::grammar::{BackendLines, parse_line_with};
use crate::manager::SessionManager;
use crate::pipeline::sink::SessionSink;
use crate::pipeline::source::LineSource;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub on_error: ErrorPolicy,
    pub backend_lines: BackendLines,
    /// Checked between lines and at end of input; once set the run stops
    /// cleanly and reports itself as interrupted.
    pub shutdown: Option<Arc<AtomicBool>>,
}

impl RunOptions {
    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines read from the source.
    pub lines: u64,
    /// Sessions delivered to the sink.
    pub finished: u64,
    /// Lines dropped under [`ErrorPolicy::Skip`].
    pub skipped: u64,
    /// Backend-direction lines dropped under [`BackendLines::Skip`].
    pub backend_skipped: u64,
    /// Sessions still live when the run ended.
    pub open: usize,
    pub interrupted: bool,
}

enum LineOutcome {
    Routed,
    Finished,
    BackendSkipped,
}

fn process_line(
    line: &str,
    manager: &mut SessionManager<'_>,
    sink: &mut dyn SessionSink,
    backend_lines: BackendLines,
) -> Result<LineOutcome, PipelineError> {
    let Some(raw) = parse_line_with(line, backend_lines)? else {
        return Ok(LineOutcome::BackendSkipped);
    };

    match manager.route(raw)? {
        Some(finished) => {
            sink.deliver(&finished)?;
            Ok(LineOutcome::Finished)
        }
        None => Ok(LineOutcome::Routed),
    }
}

/// Drive every line of `source` through `manager`, delivering finished
/// sessions to `sink`.
///
/// Under [`ErrorPolicy::Abort`] the first malformed line or invalid payload
/// ends the run with that error. Sessions still open at that point are not
/// delivered.
pub fn run_pipeline(
    source: &mut dyn LineSource,
    sink: &mut dyn SessionSink,
    manager: &mut SessionManager<'_>,
    opts: &RunOptions,
) -> Result<RunSummary, PipelineError> {
    let mut summary = RunSummary::default();

    loop {
        if opts.shutdown_requested() {
            debug!("shutdown requested, stopping");
            summary.interrupted = true;
            break;
        }

        let line = match source.next_line() {
            Ok(Some(line)) => Ok(line),
            Ok(None) => {
                // A signalled child ends its output before the flag is seen.
                if opts.shutdown_requested() {
                    debug!("shutdown requested, input ended");
                    summary.interrupted = true;
                }
                break;
            }
            Err(e) if e.is_line_violation() => Err(e),
            Err(e) => return Err(e),
        };
        summary.lines += 1;

        let outcome = line.and_then(|line| process_line(&line, manager, sink, opts.backend_lines));
        match outcome {
            Ok(LineOutcome::Routed) => {}
            Ok(LineOutcome::Finished) => summary.finished += 1,
            Ok(LineOutcome::BackendSkipped) => summary.backend_skipped += 1,
            Err(e) if e.is_line_violation() && opts.on_error == ErrorPolicy::Skip => {
                warn!(line_no = summary.lines, error = %e, "skipping line");
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    sink.flush()?;
    summary.open = manager.live_count();

    Ok(summary)
}
