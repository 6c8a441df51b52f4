use crate::grammar::BackendLines;
use serde::{Deserialize, Serialize};

/// How the pipeline reacts to a malformed line or an invalid payload.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the whole run on the first violation.
    #[default]
    Abort,
    /// Log the violation and move on to the next line.
    Skip,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Field mapping followed by the raw history.
    Pretty,
    /// One JSON object per finished session.
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VarnishlogConfig {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

fn default_program() -> String {
    "varnishlog".to_string()
}

fn default_args() -> Vec<String> {
    vec!["-cOu".to_string()]
}

impl Default for VarnishlogConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProcessorConfig {
    #[serde(default)]
    pub on_error: ErrorPolicy,

    #[serde(default)]
    pub backend_lines: BackendLines,

    /// Keep every finished session for an end-of-run summary.
    #[serde(default)]
    pub retain_finished: bool,

    /// Log sessions still open when the input ends.
    #[serde(default)]
    pub report_open: bool,

    /// Unset means: pretty on a terminal, json otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,

    #[serde(default)]
    pub varnishlog: VarnishlogConfig,
}

impl ProcessorConfig {
    pub fn validate(&self) -> Result<(), super::ConfigError> {
        if self.varnishlog.program.trim().is_empty() {
            return Err(super::ConfigError::invalid(
                "varnishlog.program must not be empty",
            ));
        }
        Ok(())
    }
}
