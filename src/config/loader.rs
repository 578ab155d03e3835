//! Settings loading.
//!
//! Builds the final settings map once, at construction:
//! 1. Environment variables under the prefix (lowest priority)
//! 2. The settings file, from the explicit argument or the
//!    `<PREFIX>_<SUFFIX>` environment variable
//! 3. Subtree filtering
//! 4. An optional user parser

use super::env::{DEFAULT_SPLIT_CHAR, EnvParser, EnvSnapshot, env_var_name};
use super::files::read_settings_file;
use super::filter::{FilterSpec, subtree};
use super::merge::deep_merge_all;
use super::types::{NestedMap, SettingsView, Value};
use crate::error::{Result, SettingsError};
use crate::logging::{LogSink, Logger};
use std::sync::Arc;

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "APP_SETTINGS";

/// Default suffix of the variable naming the settings file.
pub const DEFAULT_SETTINGS_FILE_ENV_SUFFIX: &str = "SETTINGS_FILE";

/// Nesting depth applied to environment variable names.
const ENV_MAX_DEPTH: usize = 1;

/// Root label used in filter diagnostics.
const FILTER_ROOT: &str = "settings";

/// Post-processing hook applied to the filtered settings map.
pub type SettingsParser = Arc<dyn Fn(NestedMap) -> anyhow::Result<NestedMap> + Send + Sync>;

/// Inputs for [`Settings::new`].
#[derive(Clone)]
pub struct SettingsOptions {
    /// Path to a settings file, or inline settings text.
    pub settings_file: Option<String>,
    pub env_prefix: String,
    pub settings_file_env_suffix: String,
    pub filters: FilterSpec,
    pub parser: Option<SettingsParser>,
    /// Environment to read; the process environment when `None`.
    pub env: Option<EnvSnapshot>,
    pub logger: Logger,
}

impl Default for SettingsOptions {
    fn default() -> Self {
        Self {
            settings_file: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            settings_file_env_suffix: DEFAULT_SETTINGS_FILE_ENV_SUFFIX.to_string(),
            filters: FilterSpec::All,
            parser: None,
            env: None,
            logger: Logger::new(),
        }
    }
}

impl SettingsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings_file(mut self, settings_file: impl Into<String>) -> Self {
        self.settings_file = Some(settings_file.into());
        self
    }

    pub fn with_env_prefix(mut self, env_prefix: impl Into<String>) -> Self {
        self.env_prefix = env_prefix.into();
        self
    }

    pub fn with_settings_file_env_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.settings_file_env_suffix = suffix.into();
        self
    }

    pub fn with_filters(mut self, filters: impl Into<FilterSpec>) -> Self {
        self.filters = filters.into();
        self
    }

    pub fn with_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(NestedMap) -> anyhow::Result<NestedMap> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Use this environment instead of the process environment.
    pub fn with_env(mut self, env: EnvSnapshot) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }
}

/// Immutable settings map built from the environment and a settings file.
pub struct Settings {
    settings_file: Option<String>,
    env_prefix: String,
    settings_file_env_suffix: String,
    settings_file_env_var: String,
    filters: FilterSpec,
    parser: Option<SettingsParser>,
    data: NestedMap,
}

impl Settings {
    /// Build settings from the process environment with default options.
    pub fn from_env() -> Result<Self> {
        Self::new(SettingsOptions::default())
    }

    /// Build the settings map. Failures are logged before being returned.
    pub fn new(options: SettingsOptions) -> Result<Self> {
        let logger = options.logger.clone();
        Self::build(options)
            .inspect_err(|e| logger.error(&format!("Failed to load settings: {}", e)))
    }

    fn build(options: SettingsOptions) -> Result<Self> {
        let SettingsOptions {
            settings_file,
            env_prefix,
            settings_file_env_suffix,
            filters,
            parser,
            env,
            logger,
        } = options;

        let env_prefix = env_var_name(&[env_prefix.as_str()], DEFAULT_SPLIT_CHAR);
        let settings_file_env_var = env_var_name(
            &[env_prefix.as_str(), settings_file_env_suffix.as_str()],
            DEFAULT_SPLIT_CHAR,
        );

        let env = env.unwrap_or_else(EnvSnapshot::capture);
        // An empty explicit argument falls back to the environment variable.
        let settings_file = settings_file
            .filter(|file| !file.is_empty())
            .or_else(|| env.get(&settings_file_env_var).map(str::to_string));

        let file_map = read_settings_file(settings_file.as_deref())?;
        let env_map = EnvParser::new(&env_prefix)
            .with_max_depth(ENV_MAX_DEPTH)
            .with_exclude([settings_file_env_var.as_str()])
            .parse(&env, &logger)?;

        // File values override environment values.
        let merged = deep_merge_all([env_map, file_map]);
        let filtered = subtree(&merged, &filters, &[FILTER_ROOT.to_string()], &logger).into_owned();

        let data = match parser {
            Some(ref parse) => {
                parse(filtered).map_err(|e| SettingsError::Parser(format!("{:#}", e)))?
            }
            None => filtered,
        };

        Ok(Self {
            settings_file,
            env_prefix,
            settings_file_env_suffix,
            settings_file_env_var,
            filters,
            parser,
            data,
        })
    }

    /// The effective settings file argument (explicit or from the environment).
    pub fn settings_file(&self) -> Option<&str> {
        self.settings_file.as_deref()
    }

    /// Normalized prefix, e.g. `MY_APP`.
    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    pub fn settings_file_env_suffix(&self) -> &str {
        &self.settings_file_env_suffix
    }

    /// Name of the variable that may point at a settings file.
    pub fn settings_file_env_var(&self) -> &str {
        &self.settings_file_env_var
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.data.iter()
    }

    pub fn into_map(self) -> NestedMap {
        self.data
    }
}

impl SettingsView for Settings {
    fn as_map(&self) -> &NestedMap {
        &self.data
    }
}

impl std::ops::Index<&str> for Settings {
    type Output = Value;

    /// Panics if `key` is absent; use [`SettingsView::get`] to check first.
    fn index(&self, key: &str) -> &Value {
        match self.data.get(key) {
            Some(value) => value,
            None => panic!("settings key not found: {}", key),
        }
    }
}

impl<'a> IntoIterator for &'a Settings {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Settings({:?}, {:?}, {:?}, {}, {})",
            self.settings_file,
            self.env_prefix,
            self.settings_file_env_suffix,
            self.filters,
            if self.parser.is_some() { "Some(<parser>)" } else { "None" }
        )
    }
}
