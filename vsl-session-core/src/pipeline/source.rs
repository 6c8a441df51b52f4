use crate::conf::VarnishlogConfig;
use crate::error::{MalformedLineError, PipelineError};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, info};

/// Producer of log lines, in order, without their line terminator.
///
/// A line that is not valid UTF-8 comes back as
/// [`PipelineError::MalformedLine`]; the source stays usable afterwards.
pub trait LineSource {
    fn next_line(&mut self) -> Result<Option<String>, PipelineError>;

    /// Release whatever backs the source once the pipeline is done with it.
    fn finish(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

fn read_trimmed<R: BufRead>(reader: &mut R) -> Result<Option<String>, PipelineError> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    match String::from_utf8(buf) {
        Ok(line) => Ok(Some(line)),
        Err(e) => {
            let lossy = String::from_utf8_lossy(e.as_bytes()).into_owned();
            Err(MalformedLineError::new(lossy).into())
        }
    }
}

//-----------------------------------------------------------------------------
// Readers (stdin, files, in-memory buffers)
//-----------------------------------------------------------------------------

pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl ReaderSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        let file = File::open(path).map_err(|e| {
            PipelineError::source_failed(format!("cannot open {}: {e}", path.display()))
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn next_line(&mut self) -> Result<Option<String>, PipelineError> {
        read_trimmed(&mut self.reader)
    }
}

//-----------------------------------------------------------------------------
// Spawned varnishlog
//-----------------------------------------------------------------------------

/// Reads the stdout of a `varnishlog` child process.
///
/// `finish` interrupts the child with SIGINT and reaps it. A child that ends
/// because of that SIGINT counts as a clean exit.
pub struct VarnishlogSource {
    child: Child,
    stdout: Option<BufReader<ChildStdout>>,
}

impl VarnishlogSource {
    pub fn spawn(cfg: &VarnishlogConfig) -> Result<Self, PipelineError> {
        let mut child = Command::new(&cfg.program)
            .args(&cfg.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                PipelineError::source_failed(format!("failed to start {}: {e}", cfg.program))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PipelineError::source_failed("child stdout was not captured"))?;

        info!(program = %cfg.program, pid = child.id(), "varnishlog started");

        Ok(Self {
            child,
            stdout: Some(BufReader::new(stdout)),
        })
    }

    /// Handle that can stop the child from another thread, for example a
    /// signal handler. Once the child exits, the blocked read sees EOF.
    pub fn interrupter(&self) -> Result<ChildInterrupt, PipelineError> {
        let raw = i32::try_from(self.child.id()).map_err(|_| {
            PipelineError::source_failed(format!(
                "varnishlog pid {} out of range",
                self.child.id()
            ))
        })?;

        Ok(ChildInterrupt {
            pid: Pid::from_raw(raw),
        })
    }
}

/// Sends SIGINT to a spawned `varnishlog`.
#[derive(Debug, Clone, Copy)]
pub struct ChildInterrupt {
    pid: Pid,
}

impl ChildInterrupt {
    pub fn interrupt(&self) -> Result<(), PipelineError> {
        match kill(self.pid, Signal::SIGINT) {
            // Already gone.
            Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
            Err(e) => Err(PipelineError::source_failed(format!(
                "failed to interrupt varnishlog: {e}"
            ))),
        }
    }
}

impl LineSource for VarnishlogSource {
    fn next_line(&mut self) -> Result<Option<String>, PipelineError> {
        match self.stdout.as_mut() {
            Some(reader) => read_trimmed(reader),
            None => Ok(None),
        }
    }

    fn finish(&mut self) -> Result<(), PipelineError> {
        let running = self
            .child
            .try_wait()
            .map_err(|e| PipelineError::source_failed(format!("failed to poll varnishlog: {e}")))?
            .is_none();

        if running {
            self.interrupter()?.interrupt()?;
        }

        // Close our end of the pipe so a blocked writer sees EPIPE.
        self.stdout = None;

        let status = self
            .child
            .wait()
            .map_err(|e| PipelineError::source_failed(format!("failed to reap varnishlog: {e}")))?;

        debug!(?status, "varnishlog exited");

        if status.success() || status.signal() == Some(Signal::SIGINT as i32) {
            Ok(())
        } else {
            Err(PipelineError::source_failed(format!(
                "varnishlog exited with {status}"
            )))
        }
    }
}
