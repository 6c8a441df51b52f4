use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vsl_session_core::cli;
use vsl_session_core::cli::run::RunArgs;
use vsl_session_core::logging::init_logging;

#[derive(Parser, Debug)]
#[command(
    name = "vsl-session",
    version,
    about = "vsl-session: reassemble varnishlog client sessions"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read log lines and print every session as it closes (default)
    Run(RunArgs),

    /// List the tags that populate session fields
    Tags,

    /// Config tooling
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCmd {
    /// Load a config file and print the effective settings
    Check {
        /// Path to the config file
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    init_logging();

    let result = match cli.command {
        Some(Command::Run(args)) => cli::run::run(args),
        Some(Command::Tags) => cli::tags::run(),
        Some(Command::Config {
            cmd: ConfigCmd::Check { path },
        }) => cli::config::check(path),
        None => cli::run::run(RunArgs::default()),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "run aborted");
        eprintln!("vsl-session error: {e:#}");
        std::process::exit(1);
    }
}
