use crate::conf::{ConfigError, ProcessorConfig};
use std::fs;
use std::path::Path;

pub fn load_config(path: &Path) -> Result<ProcessorConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let cfg: ProcessorConfig = toml::from_str(&s).map_err(|e| ConfigError::parse(path, e))?;

    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` when given, otherwise fall back to the built-in defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<ProcessorConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(ProcessorConfig::default()),
    }
}
