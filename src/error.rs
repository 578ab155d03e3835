//! Error types for settings materialization.

use thiserror::Error;

/// Errors raised while building a [`Settings`](crate::config::Settings) map.
///
/// The only soft failure in the pipeline (a missing section during filtering)
/// is logged instead of being returned, so it has no variant here.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The env var split character was not exactly one character.
    #[error("split character must be a single character, got {0:?}")]
    InvalidSplitChar(String),

    /// A filter value had a shape that can not describe a subtree.
    #[error("unsupported filter specification: {0}")]
    UnsupportedFilter(String),

    #[error("failed to read settings file {path}: {source}")]
    SettingsFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Neither an existing file nor inline settings text.
    #[error("settings file not found: {0}")]
    SettingsFileNotFound(String),

    #[error("failed to parse settings from {origin}: {message}")]
    Parse { origin: String, message: String },

    /// The settings document parsed, but its top level is not a table.
    #[error("settings document {0} must contain a table at the top level")]
    InvalidDocument(String),

    /// The user supplied parser rejected the settings map.
    #[error("settings parser failed: {0}")]
    Parser(String),

    #[error("settings key not found: {0}")]
    KeyNotFound(String),

    #[error("failed to render settings as {format}: {message}")]
    Render { format: String, message: String },
}

impl SettingsError {
    pub fn invalid_split_char<S: Into<String>>(split_char: S) -> Self {
        Self::InvalidSplitChar(split_char.into())
    }

    pub fn unsupported_filter<S: Into<String>>(shape: S) -> Self {
        Self::UnsupportedFilter(shape.into())
    }

    pub fn settings_file<S: Into<String>>(path: S, source: std::io::Error) -> Self {
        Self::SettingsFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse(origin: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: err.to_string(),
        }
    }

    pub fn key_not_found<S: Into<String>>(key: S) -> Self {
        Self::KeyNotFound(key.into())
    }

    pub fn render(format: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::Render {
            format: format.to_string(),
            message: err.to_string(),
        }
    }

    /// True for errors produced while locating or decoding the settings file.
    pub fn is_settings_file_error(&self) -> bool {
        matches!(
            self,
            Self::SettingsFile { .. }
                | Self::SettingsFileNotFound(_)
                | Self::Parse { .. }
                | Self::InvalidDocument(_)
        )
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_file_category() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(SettingsError::settings_file("a.toml", io).is_settings_file_error());
        assert!(SettingsError::SettingsFileNotFound("a.toml".into()).is_settings_file_error());
        assert!(SettingsError::parse("a.toml", "bad").is_settings_file_error());
        assert!(!SettingsError::unsupported_filter("number").is_settings_file_error());
        assert!(!SettingsError::key_not_found("a").is_settings_file_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            SettingsError::invalid_split_char("__").to_string(),
            "split character must be a single character, got \"__\""
        );
        assert_eq!(
            SettingsError::key_not_found("section1").to_string(),
            "settings key not found: section1"
        );
    }
}
