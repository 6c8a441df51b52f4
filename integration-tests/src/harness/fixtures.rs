use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use vsl_session_core::pipeline::{
    CollectingSink, ReaderSource, RunOptions, RunSummary, run_pipeline,
};
use vsl_session_core::session::Session;
use vsl_session_core::{FinishedSession, PipelineError, SessionManager, TagRuleRegistry};

pub fn fixture_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(file)
}

/// Everything observable after running one fixture through the pipeline.
pub struct FixtureRun {
    pub result: Result<RunSummary, PipelineError>,
    pub delivered: Vec<FinishedSession>,
    pub still_open: Vec<Session>,
}

pub fn run_fixture(file: &str, opts: &RunOptions) -> FixtureRun {
    let path = fixture_path(file);
    let file = File::open(&path).unwrap_or_else(|e| panic!("open {}: {e}", path.display()));

    let mut source = ReaderSource::new(BufReader::new(file));
    let mut sink = CollectingSink::default();
    let mut manager = SessionManager::new(TagRuleRegistry::builtin());

    let result = run_pipeline(&mut source, &mut sink, &mut manager, opts);

    FixtureRun {
        result,
        delivered: sink.sessions,
        still_open: manager.into_open_sessions(),
    }
}
