use crate::conf::{ErrorPolicy, OutputFormat, ProcessorConfig, load_config_or_default};
use crate::grammar::BackendLines;
use crate::logging::{default_output_format, stdout_supports_color};
use crate::manager::SessionManager;
use crate::pipeline::{
    ChildInterrupt, LineSource, ReaderSource, RunOptions, VarnishlogSource, render_summary,
    run_pipeline, sink_for,
};
use crate::registry::TagRuleRegistry;
use anyhow::{Context, Result};
use clap::Args;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Log file to read; `-` or nothing reads stdin
    #[arg(long, short, conflicts_with = "varnishlog")]
    pub input: Option<PathBuf>,

    /// Spawn varnishlog and read its output
    #[arg(long)]
    pub varnishlog: bool,

    /// Output format (default: pretty on a terminal, json otherwise)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Path to a vsl-session TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log and skip bad lines instead of aborting
    #[arg(long)]
    pub skip_invalid: bool,

    /// Skip backend-direction lines instead of rejecting them
    #[arg(long)]
    pub skip_backend: bool,

    /// Keep finished sessions and summarize them at the end
    #[arg(long)]
    pub retain_finished: bool,

    /// Log sessions that never closed when input ends
    #[arg(long)]
    pub report_open: bool,
}

impl RunArgs {
    /// Command line flags win over the config file.
    pub fn apply_to(&self, cfg: &mut ProcessorConfig) {
        if self.skip_invalid {
            cfg.on_error = ErrorPolicy::Skip;
        }
        if self.skip_backend {
            cfg.backend_lines = BackendLines::Skip;
        }
        if self.retain_finished {
            cfg.retain_finished = true;
        }
        if self.report_open {
            cfg.report_open = true;
        }
        if let Some(format) = self.format {
            cfg.format = Some(format);
        }
    }
}

/// The opened source, plus a handle on the varnishlog child when there is one.
fn open_source(
    args: &RunArgs,
    cfg: &ProcessorConfig,
) -> Result<(Box<dyn LineSource>, Option<ChildInterrupt>)> {
    if args.varnishlog {
        let source = VarnishlogSource::spawn(&cfg.varnishlog)?;
        let child = source.interrupter()?;
        return Ok((Box::new(source), Some(child)));
    }

    let source: Box<dyn LineSource> = match &args.input {
        Some(path) if path.as_os_str() != "-" => Box::new(ReaderSource::open(path)?),
        _ => Box::new(ReaderSource::new(BufReader::new(io::stdin()))),
    };
    Ok((source, None))
}

/// Stop on SIGINT/SIGTERM/SIGHUP.
///
/// The flag is checked between lines. The child is interrupted as well, so a
/// read blocked on an idle varnishlog ends with EOF.
fn install_shutdown_handler(child: ChildInterrupt) -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = flag.clone();

    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
        if let Err(e) = child.interrupt() {
            warn!(error = %e, "could not stop varnishlog");
        }
    })
    .context("failed to install signal handler")?;

    Ok(flag)
}

pub fn run(args: RunArgs) -> Result<()> {
    let mut cfg = load_config_or_default(args.config.as_deref())?;
    args.apply_to(&mut cfg);

    let format = cfg.format.unwrap_or_else(default_output_format);

    let mut manager = SessionManager::new(TagRuleRegistry::builtin());
    if cfg.retain_finished {
        manager = manager.retaining_finished();
    }

    let (mut source, child) = open_source(&args, &cfg)?;

    // Only varnishlog mode takes over the signals; plain input keeps the
    // default behaviour.
    let shutdown = match child.map(install_shutdown_handler).transpose() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            let _ = source.finish();
            return Err(e);
        }
    };

    let opts = RunOptions {
        on_error: cfg.on_error,
        backend_lines: cfg.backend_lines,
        shutdown,
    };

    let mut sink = sink_for(format, io::stdout(), stdout_supports_color());

    let result = run_pipeline(source.as_mut(), sink.as_mut(), &mut manager, &opts);
    // The source is released even when the run failed.
    let finished = source.finish();

    let summary = result?;
    finished?;

    info!(summary = %render_summary(&summary), "run complete");

    if let Some(archive) = manager.finished() {
        info!(
            retained = archive.len(),
            ids = ?archive.iter().map(|s| s.id.0).collect::<Vec<_>>(),
            "finished sessions"
        );
    }

    if cfg.report_open {
        for session in manager.into_open_sessions() {
            warn!(
                session_id = session.id().0,
                lines = session.raw_history().len(),
                "session never closed"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::RunArgs;
    use crate::conf::{ErrorPolicy, OutputFormat, ProcessorConfig};
    use crate::grammar::BackendLines;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        run: RunArgs,
    }

    #[test]
    fn flags_override_config() {
        // Arrange
        let cli = TestCli::parse_from([
            "vsl-session",
            "--skip-invalid",
            "--skip-backend",
            "--format",
            "json",
        ]);
        let mut cfg = ProcessorConfig::default();

        // Act
        cli.run.apply_to(&mut cfg);

        // Assert
        assert_eq!(cfg.on_error, ErrorPolicy::Skip);
        assert_eq!(cfg.backend_lines, BackendLines::Skip);
        assert_eq!(cfg.format, Some(OutputFormat::Json));
        assert!(!cfg.retain_finished);
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let cli = TestCli::parse_from(["vsl-session"]);
        let mut cfg = ProcessorConfig {
            on_error: ErrorPolicy::Skip,
            retain_finished: true,
            ..ProcessorConfig::default()
        };

        cli.run.apply_to(&mut cfg);

        assert_eq!(cfg.on_error, ErrorPolicy::Skip);
        assert!(cfg.retain_finished);
        assert_eq!(cfg.format, None);
    }

    #[test]
    fn input_conflicts_with_varnishlog() {
        let res = TestCli::try_parse_from(["vsl-session", "--input", "a.log", "--varnishlog"]);

        assert!(res.is_err());
    }
}
