//! Settings file reading.
//!
//! A settings source is either a path to a file or the settings text itself.
//! Files are read once and parsed according to their extension (TOML by
//! default, YAML for `.yaml`/`.yml`, JSON for `.json`). Inline text is
//! recognized by its first non-blank character: `[` for TOML, `{` for JSON.

use super::types::{NestedMap, Value};
use crate::error::{Result, SettingsError};
use std::path::{Path, PathBuf};

/// Text format of a settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    /// Format implied by a file extension. Unknown extensions are TOML.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => FileFormat::Yaml,
            "json" => FileFormat::Json,
            _ => FileFormat::Toml,
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Toml => write!(f, "toml"),
            FileFormat::Yaml => write!(f, "yaml"),
            FileFormat::Json => write!(f, "json"),
        }
    }
}

/// Where the file-derived settings come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    /// An existing file on disk.
    Path(PathBuf),
    /// Settings text passed directly instead of a path.
    Inline { content: String, format: FileFormat },
}

impl SettingsSource {
    /// Classify a user supplied settings file argument.
    ///
    /// An existing file always wins; otherwise the text is treated as inline
    /// settings if it looks like a TOML table header or a JSON object.
    pub fn resolve(value: &str) -> Result<Self> {
        let path = Path::new(value);
        if path.is_file() {
            return Ok(SettingsSource::Path(path.to_path_buf()));
        }

        let trimmed = value.trim_start();
        if trimmed.starts_with('[') {
            Ok(SettingsSource::Inline {
                content: value.to_string(),
                format: FileFormat::Toml,
            })
        } else if trimmed.starts_with('{') {
            Ok(SettingsSource::Inline {
                content: value.to_string(),
                format: FileFormat::Json,
            })
        } else {
            Err(SettingsError::SettingsFileNotFound(value.to_string()))
        }
    }

    /// Read and parse the source into a nested map.
    pub fn read(&self) -> Result<NestedMap> {
        match self {
            SettingsSource::Path(path) => {
                let origin = path.display().to_string();
                let content = std::fs::read_to_string(path)
                    .map_err(|e| SettingsError::settings_file(origin.clone(), e))?;
                parse_settings(&content, FileFormat::from_path(path), &origin)
            }
            SettingsSource::Inline { content, format } => {
                parse_settings(content, *format, "inline settings")
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SettingsSource::Path(path) => Some(path),
            SettingsSource::Inline { .. } => None,
        }
    }
}

/// Read the settings for an optional source argument. No source yields an
/// empty map.
pub fn read_settings_file(settings_file: Option<&str>) -> Result<NestedMap> {
    match settings_file {
        Some(value) if !value.is_empty() => SettingsSource::resolve(value)?.read(),
        _ => Ok(NestedMap::new()),
    }
}

/// Parse settings text of the given format into a nested map.
pub fn parse_settings(content: &str, format: FileFormat, origin: &str) -> Result<NestedMap> {
    let value = match format {
        FileFormat::Toml => {
            let table: toml::Table =
                toml::from_str(content).map_err(|e| SettingsError::parse(origin, e))?;
            toml_to_json(toml::Value::Table(table))
        }
        FileFormat::Yaml => {
            // An empty YAML document is null; treat it as an empty table.
            let value: Value =
                serde_yaml::from_str(content).map_err(|e| SettingsError::parse(origin, e))?;
            if value.is_null() {
                Value::Object(NestedMap::new())
            } else {
                value
            }
        }
        FileFormat::Json => {
            serde_json::from_str(content).map_err(|e| SettingsError::parse(origin, e))?
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(SettingsError::InvalidDocument(origin.to_string())),
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}
