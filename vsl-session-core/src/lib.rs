pub mod cli;
pub mod conf;
pub mod error;
pub mod grammar;
pub mod logging;
pub mod manager;
pub mod pipeline;
pub mod registry;
pub mod session;

pub use error::{InvalidPayloadError, MalformedLineError, PipelineError};
pub use grammar::{RawLine, SessionId, parse_line};
pub use manager::SessionManager;
pub use registry::TagRuleRegistry;
pub use session::{FinishedSession, Session, SessionFields};
