//! Settings materialization.
//!
//! Combines two sources into one nested map:
//! 1. **Environment** - variables starting with the prefix (default
//!    `APP_SETTINGS`), split into nested keys on `_`
//! 2. **Settings file** - a TOML/YAML/JSON file (or inline TOML text) named
//!    by the explicit argument or the `<PREFIX>_SETTINGS_FILE` variable
//!
//! ## Merge Strategy
//! Tables are deep-merged; on conflicting leaves the settings file wins.
//! The merged map is then narrowed by a [`FilterSpec`] and optionally passed
//! through a user parser.
//!
//! ## Example
//! `MY_APP_SECTION1_SUBSECTION1=test1` with prefix `MY_APP` yields
//! `{"section1": {"subsection1": "test1"}}`.

mod env;
mod files;
mod filter;
mod loader;
mod merge;
mod types;

pub use env::{DEFAULT_MAX_DEPTH, DEFAULT_SPLIT_CHAR, EnvParser, EnvSnapshot, env_var_name};
pub use files::{FileFormat, SettingsSource, parse_settings, read_settings_file};
pub use filter::{FilterSpec, WILDCARD, subtree};
pub use loader::{
    DEFAULT_ENV_PREFIX, DEFAULT_SETTINGS_FILE_ENV_SUFFIX, Settings, SettingsOptions,
    SettingsParser,
};
pub use merge::{deep_merge_all, merge_nested};
pub use types::{NestedMap, SettingsView, Value, nest};
