//! Environment variable decomposition.
//!
//! Variables such as `MY_APP_DATABASE_HOST=db` become nested settings
//! (`{"database": {"host": "db"}}`) once the `MY_APP` prefix is stripped.
//! Matching is case-insensitive and the resulting keys are lower case.
//! Values are kept as strings.

use super::merge::merge_nested;
use super::types::{NestedMap, Value, nest};
use crate::error::{Result, SettingsError};
use crate::logging::LogSink;

/// Default separator between prefix and nesting levels.
pub const DEFAULT_SPLIT_CHAR: char = '_';

/// Default number of nesting splits applied after the prefix.
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// Build a normalized environment variable name from its parts.
///
/// Each part is stripped of leading and trailing `split_char`, uppercased,
/// and the parts are joined with `_`.
///
/// ```
/// use climatecontrol::config::env_var_name;
/// assert_eq!(env_var_name(&["my_app_", "settings_file"], '_'), "MY_APP_SETTINGS_FILE");
/// ```
pub fn env_var_name(parts: &[&str], split_char: char) -> String {
    parts
        .iter()
        .map(|part| part.trim_matches(split_char).to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Point-in-time copy of environment variables, in iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: Vec<(String, String)>,
}

impl EnvSnapshot {
    /// Snapshot the process environment. Variables whose name or value is not
    /// valid UTF-8 are skipped.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(name, value)| {
                Some((name.into_string().ok()?, value.into_string().ok()?))
            })
            .collect();
        Self { vars }
    }

    /// Exact (case-sensitive) lookup, like `std::env::var`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Turns prefixed environment variables into a [`NestedMap`].
#[derive(Debug, Clone)]
pub struct EnvParser {
    prefix: String,
    max_depth: usize,
    split_char: String,
    exclude: Vec<String>,
}

impl EnvParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            split_char: DEFAULT_SPLIT_CHAR.to_string(),
            exclude: Vec::new(),
        }
    }

    /// Maximum number of splits after the prefix. The last key keeps any
    /// remaining split characters.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Separator between nesting levels. Must be exactly one character;
    /// checked when parsing.
    pub fn with_split_char(mut self, split_char: impl Into<String>) -> Self {
        self.split_char = split_char.into();
        self
    }

    /// Variable names (case-insensitive) that are never read as settings.
    pub fn with_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn parse(&self, env: &EnvSnapshot, sink: &dyn LogSink) -> Result<NestedMap> {
        let mut settings_map = NestedMap::new();

        let mut chars = self.split_char.chars();
        let split_char = match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_lowercase().next().unwrap_or(c),
            _ => return Err(SettingsError::invalid_split_char(&self.split_char)),
        };

        let mut prefix = self
            .prefix
            .to_lowercase()
            .trim_end_matches(split_char)
            .to_string();
        prefix.push(split_char);
        // A bare separator would match every variable.
        if prefix.chars().count() <= 1 {
            return Ok(settings_map);
        }

        let exclude: Vec<String> = self.exclude.iter().map(|s| s.to_lowercase()).collect();

        for (name, value) in env.iter() {
            let name_lower = name.to_lowercase();
            if exclude.contains(&name_lower) {
                continue;
            }
            let Some(remainder) = name_lower.strip_prefix(&prefix) else {
                continue;
            };
            if remainder.is_empty() {
                continue;
            }

            let nested_keys: Vec<&str> = remainder
                .splitn(self.max_depth.saturating_add(1), split_char)
                .collect();
            sink.info(&format!("Getting settings from env var: {}", name));
            merge_nested(
                &mut settings_map,
                nest(&nested_keys, Value::String(value.to_string())),
            );
        }

        Ok(settings_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, Logger};
    use serde_json::json;

    fn env(vars: &[(&str, &str)]) -> EnvSnapshot {
        vars.iter().copied().collect()
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name(&["APP_SETTINGS"], '_'), "APP_SETTINGS");
        assert_eq!(env_var_name(&["my_app"], '_'), "MY_APP");
        assert_eq!(env_var_name(&["_my_app_"], '_'), "MY_APP");
        assert_eq!(
            env_var_name(&["APP_SETTINGS", "SETTINGS_FILE"], '_'),
            "APP_SETTINGS_SETTINGS_FILE"
        );
    }

    #[test]
    fn test_depth_one_keeps_remaining_separators() {
        let snapshot = env(&[("X_A_B", "1"), ("X_A_B_C", "2"), ("X_D", "3")]);
        let result = EnvParser::new("X").parse(&snapshot, &Logger::new()).unwrap();
        assert_eq!(
            Value::Object(result),
            json!({"a": {"b": "1", "b_c": "2"}, "d": "3"})
        );
    }

    #[test]
    fn test_depth_two() {
        let snapshot = env(&[
            ("THIS_EXAMPLE_TESTGROUP_TESTVAR", "27"),
            ("THIS_EXAMPLE_G_SUB_KEY_X", "v"),
        ]);
        let result = EnvParser::new("THIS_EXAMPLE")
            .with_max_depth(2)
            .parse(&snapshot, &Logger::new())
            .unwrap();
        assert_eq!(
            Value::Object(result),
            json!({"testgroup": {"testvar": "27"}, "g": {"sub": {"key_x": "v"}}})
        );
    }

    #[test]
    fn test_depth_zero_is_flat() {
        let snapshot = env(&[("APP_A_B_C", "1")]);
        let result = EnvParser::new("APP")
            .with_max_depth(0)
            .parse(&snapshot, &Logger::new())
            .unwrap();
        assert_eq!(Value::Object(result), json!({"a_b_c": "1"}));
    }

    #[test]
    fn test_unbounded_depth_splits_every_separator() {
        let snapshot = env(&[("APP_A_B_C", "1")]);
        let result = EnvParser::new("APP")
            .with_max_depth(usize::MAX)
            .parse(&snapshot, &Logger::new())
            .unwrap();
        assert_eq!(Value::Object(result), json!({"a": {"b": {"c": "1"}}}));
    }

    #[test]
    fn test_case_insensitive_prefix_and_lowercase_keys() {
        let snapshot = env(&[("my_app_Section_Key", "Value"), ("MY_APPX_OTHER", "no")]);
        let result = EnvParser::new("My_App").parse(&snapshot, &Logger::new()).unwrap();
        assert_eq!(Value::Object(result), json!({"section": {"key": "Value"}}));
    }

    #[test]
    fn test_empty_prefix_matches_nothing() {
        let snapshot = env(&[("A_B", "1"), ("_C", "2")]);
        assert!(EnvParser::new("").parse(&snapshot, &Logger::new()).unwrap().is_empty());
        assert!(EnvParser::new("_").parse(&snapshot, &Logger::new()).unwrap().is_empty());
    }

    #[test]
    fn test_exclusion_is_case_insensitive() {
        let snapshot = env(&[("APP_SETTINGS_FILE", "/etc/app.toml"), ("APP_DEBUG", "1")]);
        let result = EnvParser::new("APP")
            .with_exclude(["app_settings_file"])
            .parse(&snapshot, &Logger::new())
            .unwrap();
        assert_eq!(Value::Object(result), json!({"debug": "1"}));
    }

    #[test]
    fn test_prefix_only_variable_is_skipped() {
        let snapshot = env(&[("APP_", "x"), ("APP", "y")]);
        assert!(EnvParser::new("APP").parse(&snapshot, &Logger::new()).unwrap().is_empty());
    }

    #[test]
    fn test_custom_split_char() {
        let snapshot = env(&[("APP.DB.HOST", "h"), ("APP_DB_PORT", "p")]);
        let result = EnvParser::new("app")
            .with_split_char(".")
            .parse(&snapshot, &Logger::new())
            .unwrap();
        assert_eq!(Value::Object(result), json!({"db": {"host": "h"}}));
    }

    #[test]
    fn test_split_char_must_be_single_character() {
        let snapshot = env(&[]);
        for bad in ["", "__"] {
            let err = EnvParser::new("APP")
                .with_split_char(bad)
                .parse(&snapshot, &Logger::new())
                .unwrap_err();
            assert!(matches!(err, SettingsError::InvalidSplitChar(_)));
        }
    }

    #[test]
    fn test_later_variable_wins_on_conflict() {
        let snapshot = env(&[("APP_A_B", "first"), ("app_a_b", "second")]);
        let result = EnvParser::new("APP").parse(&snapshot, &Logger::new()).unwrap();
        assert_eq!(Value::Object(result), json!({"a": {"b": "second"}}));
    }

    #[test]
    fn test_each_used_variable_is_logged() {
        let logger = Logger::new().with_capture();
        let snapshot = env(&[("APP_A", "1"), ("OTHER", "2")]);
        EnvParser::new("APP").parse(&snapshot, &logger).unwrap();
        let records = logger.records_at(LogLevel::Info);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "Getting settings from env var: APP_A");
    }

    #[test]
    fn test_snapshot_get_is_exact() {
        let snapshot = env(&[("APP_SETTINGS_FILE", "a.toml")]);
        assert_eq!(snapshot.get("APP_SETTINGS_FILE"), Some("a.toml"));
        assert_eq!(snapshot.get("app_settings_file"), None);
        assert_eq!(snapshot.len(), 1);
    }
}
