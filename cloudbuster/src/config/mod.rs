//! Configuration for selection runs.
//!
//! [`SelectionConfig`] is the in-memory settings object passed to the
//! selector. [`ConfigFile`] loads the same settings, plus logging
//! destinations, from an INI file.
//!
//! # Example
//!
//! ```
//! use cloudbuster::config::{ConfigFile, SelectionConfig};
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.selection, SelectionConfig::default());
//! ```

mod file;
mod selection;

pub use file::{
    config_directory, config_file_path, ConfigFile, ConfigFileError, LoggingSettings,
};
pub use selection::{
    ConfigError, SelectionConfig, DEFAULT_COVERAGE_COUNT, DEFAULT_MAX_UNCOVERED,
    DEFAULT_MINCLOUDS,
};
