//! Session Reconstruction Pipeline
//!
//! Lines flow in from a [`LineSource`], get parsed by the line grammar and
//! routed to their session by the [`SessionManager`](crate::manager::SessionManager).
//! Whenever a line closes a session, the finished session is handed to a
//! [`SessionSink`] and forgotten.
//!
//! The overall data processing architecture is:
//!
//! LineSource
//! parse_line_with
//! RawLine
//! SessionManager::route
//! FinishedSession
//! SessionSink
//!

mod render;
mod run;
mod sink;
mod source;

pub use render::{render_pretty, render_summary};
pub use run::{RunOptions, RunSummary, run_pipeline};
pub use sink::{CollectingSink, JsonSink, PrettySink, SessionSink, sink_for};
pub use source::{ChildInterrupt, LineSource, ReaderSource, VarnishlogSource};
