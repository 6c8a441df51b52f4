use crate::conf::OutputFormat;
use crate::error::PipelineError;
use crate::pipeline::render::render_pretty;
use crate::session::FinishedSession;
use std::io::Write;

/// Consumer of finished sessions.
pub trait SessionSink {
    fn deliver(&mut self, session: &FinishedSession) -> Result<(), PipelineError>;

    fn flush(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

pub fn sink_for<W: Write + 'static>(
    format: OutputFormat,
    out: W,
    color: bool,
) -> Box<dyn SessionSink> {
    match format {
        OutputFormat::Pretty => Box::new(PrettySink::new(out, color)),
        OutputFormat::Json => Box::new(JsonSink::new(out)),
    }
}

pub struct PrettySink<W> {
    out: W,
    color: bool,
}

impl<W: Write> PrettySink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SessionSink for PrettySink<W> {
    fn deliver(&mut self, session: &FinishedSession) -> Result<(), PipelineError> {
        let block = render_pretty(session, self.color);
        self.out
            .write_all(block.as_bytes())
            .and_then(|_| self.out.write_all(b"\n"))
            .map_err(PipelineError::sink)
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        self.out.flush().map_err(PipelineError::sink)
    }
}

/// One JSON document per line.
pub struct JsonSink<W> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SessionSink for JsonSink<W> {
    fn deliver(&mut self, session: &FinishedSession) -> Result<(), PipelineError> {
        serde_json::to_writer(&mut self.out, session)
            .map_err(|e| PipelineError::sink(e.into()))?;
        self.out.write_all(b"\n").map_err(PipelineError::sink)
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        self.out.flush().map_err(PipelineError::sink)
    }
}

/// Keeps finished sessions in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub sessions: Vec<FinishedSession>,
}

impl SessionSink for CollectingSink {
    fn deliver(&mut self, session: &FinishedSession) -> Result<(), PipelineError> {
        self.sessions.push(session.clone());
        Ok(())
    }
}
