//! Outer line grammar for `varnishlog -cOu` style output.
//!
//! Every accepted line has the shape
//!
//! ```text
//!    <session id> <tag> <direction> <payload...>
//! ```
//!
//! where `<direction>` is `c` for client-side records. Backend-side records
//! (`b`) are rejected unless the caller asks for them to be skipped.


use crate::error::MalformedLineError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// Separators are ASCII whitespace only; a no-break space belongs to the token.
static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[ \t\n\r\x0B\x0C]*([0-9]+)",
        r"[ \t\n\r\x0B\x0C]+([^ \t\n\r\x0B\x0C]+)",
        r"[ \t\n\r\x0B\x0C]+([^ \t\n\r\x0B\x0C])",
        r"[ \t\n\r\x0B\x0C]+(.+)$",
    ))
    .expect("line pattern is valid")
});

pub const CLIENT_MARKER: &str = "c";
pub const BACKEND_MARKER: &str = "b";

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SessionId {
    fn from(id: u64) -> Self {
        SessionId(id)
    }
}

/// One parsed line. Consumed immediately by the session manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub session_id: SessionId,
    pub tag: String,
    pub payload: String,
}

/// What to do with backend-direction (`b`) lines.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendLines {
    #[default]
    Reject,
    Skip,
}

/// Parse one line, accepting client-direction records only.
pub fn parse_line(line: &str) -> Result<RawLine, MalformedLineError> {
    parse_line_with(line, BackendLines::Reject)?.ok_or_else(|| MalformedLineError::new(line))
}

/// Parse one line. Returns `Ok(None)` for a backend record under
/// [`BackendLines::Skip`].
pub fn parse_line_with(
    line: &str,
    backend: BackendLines,
) -> Result<Option<RawLine>, MalformedLineError> {
    let caps = LINE_PATTERN
        .captures(line)
        .ok_or_else(|| MalformedLineError::new(line))?;

    match (&caps[3], backend) {
        (CLIENT_MARKER, _) => {}
        (BACKEND_MARKER, BackendLines::Skip) => return Ok(None),
        _ => return Err(MalformedLineError::new(line)),
    }

    // Digits that overflow u64 are as malformed as no digits at all.
    let session_id = caps[1]
        .parse::<u64>()
        .map_err(|_| MalformedLineError::new(line))?;

    Ok(Some(RawLine {
        session_id: SessionId(session_id),
        tag: caps[2].to_string(),
        payload: caps[4].to_string(),
    }))
}
