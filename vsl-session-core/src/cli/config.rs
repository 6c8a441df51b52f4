use crate::conf::{ConfigError, ProcessorConfig, load_config};
use anyhow::Result;
use std::path::PathBuf;

pub fn check(path: PathBuf) -> Result<()> {
    match load_config(&path) {
        Ok(cfg) => {
            println!("✔ Config loaded successfully");
            print!("{}", render_effective(&cfg)?);
            Ok(())
        }
        Err(err) => {
            print_config_error(&err);
            std::process::exit(1);
        }
    }
}

pub fn render_effective(cfg: &ProcessorConfig) -> Result<String> {
    Ok(toml::to_string(cfg)?)
}

fn print_config_error(err: &ConfigError) {
    eprintln!("{err}");
    if let Some(hint) = config_error_hint(err) {
        eprintln!();
        eprintln!("{hint}");
    }
}

pub fn config_error_hint(err: &ConfigError) -> Option<&'static str> {
    match err {
        ConfigError::Parse { .. } => Some(
            "Recognised settings:\n\
             \n\
             on_error        = \"abort\" | \"skip\"\n\
             backend_lines   = \"reject\" | \"skip\"\n\
             retain_finished = true | false\n\
             report_open     = true | false\n\
             format          = \"pretty\" | \"json\"\n\
             \n\
             [varnishlog]\n\
             program = \"varnishlog\"\n\
             args    = [\"-cOu\"]",
        ),
        ConfigError::Invalid { .. } => Some(
            "The [varnishlog] table needs a program to run, e.g. program = \"varnishlog\".",
        ),
        ConfigError::ReadFile { .. } => None,
    }
}
