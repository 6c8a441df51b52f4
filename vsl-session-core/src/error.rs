use thiserror::Error;

/// A line that does not have the `<id> <tag> c <payload>` shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed log line: {line:?}")]
pub struct MalformedLineError {
    pub line: String,
}

impl MalformedLineError {
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }
}

/// A payload rejected by its tag's micro-grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {tag} payload: {payload:?}")]
pub struct InvalidPayloadError {
    pub tag: &'static str,
    pub payload: String,
}

impl InvalidPayloadError {
    pub fn new(tag: &'static str, payload: impl Into<String>) -> Self {
        Self {
            tag,
            payload: payload.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    //-------------------------------------------------------------------------
    // Input violations
    //-------------------------------------------------------------------------
    #[error(transparent)]
    MalformedLine(#[from] MalformedLineError),

    #[error(transparent)]
    InvalidPayload(#[from] InvalidPayloadError),

    //-------------------------------------------------------------------------
    // IO
    //-------------------------------------------------------------------------
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write session output: {source}")]
    Sink {
        #[source]
        source: std::io::Error,
    },

    #[error("line source failed: {reason}")]
    Source { reason: String },
}

impl PipelineError {
    pub fn sink(source: std::io::Error) -> Self {
        Self::Sink { source }
    }

    pub fn source_failed(reason: impl Into<String>) -> Self {
        Self::Source {
            reason: reason.into(),
        }
    }

    /// True for errors caused by the content of a single input line.
    pub fn is_line_violation(&self) -> bool {
        matches!(self, Self::MalformedLine(_) | Self::InvalidPayload(_))
    }
}
