//! Output formatting for materialized settings.

use crate::config::{NestedMap, Value};
use crate::error::{Result, SettingsError};
use clap::ValueEnum;

/// Output format for rendered settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
    #[value(alias = "yml")]
    Yaml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Toml => "toml",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Render a settings map in the given format.
pub fn render(map: &NestedMap, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(map).map_err(|e| SettingsError::render(format, e))
        }
        OutputFormat::Toml => {
            toml::to_string_pretty(map).map_err(|e| SettingsError::render(format, e))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(map).map_err(|e| SettingsError::render(format, e))
        }
    }
}

/// Render a single value. Strings print raw, tables use `format`, other
/// values print as JSON.
pub fn render_value(value: &Value, format: OutputFormat) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Object(map) => render(map, format),
        other => Ok(other.to_string()),
    }
}
