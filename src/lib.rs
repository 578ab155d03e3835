//! climatecontrol
//!
//! Merges settings from prefixed environment variables and an optional
//! settings file into one nested map, narrowed by a declarative filter.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;

pub use config::{FilterSpec, NestedMap, Settings, SettingsOptions, SettingsView};
pub use error::{Result, SettingsError};
