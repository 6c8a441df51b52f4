mod fixtures;
pub mod tracing;

pub use self::fixtures::{FixtureRun, fixture_path, run_fixture};
pub use self::tracing::{CapturedEvent, captured_events, init_test_tracing};
