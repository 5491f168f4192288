//! Configuration file handling for ~/.cloudbuster/config.ini.
//!
//! ```ini
//! [selection]
//! backstop = true
//! coverage_count = 3
//! max_selections = 12
//! minclouds = 0.0
//! max_uncovered = 0.0005
//! name_regexp = ^S2B
//! date_regexp = ^2019-0[6-8]
//! max_iterations =
//! time_budget_secs = 30
//!
//! [logging]
//! directory = logs
//! file = cloudbuster.log
//! ```
//!
//! Missing keys keep their defaults. An empty value clears an optional
//! setting.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::{EscapePolicy, Ini, ParseOption, Properties, WriteOption};
use thiserror::Error;

use super::SelectionConfig;
use crate::logging::{DEFAULT_LOG_DIR, DEFAULT_LOG_FILE};

const SELECTION_SECTION: &str = "selection";
const LOGGING_SECTION: &str = "logging";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

/// Logging settings from the `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Directory for the log file.
    pub directory: PathBuf,
    /// Log file name inside `directory`.
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIR),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub selection: SelectionConfig,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load configuration from the default path (~/.cloudbuster/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file_opt(path, parse_option())?;
        parse_ini(&ini)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let write_option = WriteOption {
            escape_policy: EscapePolicy::Nothing,
            ..Default::default()
        };
        to_ini(self)
            .write_to_file_opt(path, write_option)
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }
}

/// Get the path to the config directory (~/.cloudbuster).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cloudbuster")
}

/// Get the path to the config file (~/.cloudbuster/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// Backslashes are common in filter patterns, so escapes stay literal.
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        ..Default::default()
    }
}

/// Overlay INI values onto the defaults.
fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    if let Some(section) = ini.section(Some(SELECTION_SECTION)) {
        let selection = &mut config.selection;

        if let Some(v) = section.get("backstop") {
            selection.backstop = parse_bool(v).ok_or_else(|| {
                invalid(SELECTION_SECTION, "backstop", v, "must be true or false")
            })?;
        }
        if let Some(v) = parse_number::<usize>(section, "coverage_count")? {
            selection.coverage_count = v;
        }
        if section.contains_key("max_selections") {
            selection.max_selections = parse_number(section, "max_selections")?;
        }
        if let Some(v) = parse_number::<f64>(section, "minclouds")? {
            selection.minclouds = v;
        }
        if let Some(v) = parse_number::<f64>(section, "max_uncovered")? {
            selection.max_uncovered = v;
        }
        if section.contains_key("name_regexp") {
            selection.name_regexp = non_empty(section.get("name_regexp"));
        }
        if section.contains_key("date_regexp") {
            selection.date_regexp = non_empty(section.get("date_regexp"));
        }
        if section.contains_key("max_iterations") {
            selection.max_iterations = parse_number(section, "max_iterations")?;
        }
        if section.contains_key("time_budget_secs") {
            selection.time_budget = match parse_number::<f64>(section, "time_budget_secs")? {
                Some(secs) => Some(Duration::try_from_secs_f64(secs).map_err(|_| {
                    invalid(
                        SELECTION_SECTION,
                        "time_budget_secs",
                        &secs.to_string(),
                        "must be a non-negative number of seconds",
                    )
                })?),
                None => None,
            };
        }

        if let Err(e) = selection.validate() {
            let value = match e.option() {
                "name_regexp" => selection.name_regexp.clone().unwrap_or_default(),
                "date_regexp" => selection.date_regexp.clone().unwrap_or_default(),
                "max_uncovered" => selection.max_uncovered.to_string(),
                "minclouds" => selection.minclouds.to_string(),
                _ => String::new(),
            };
            return Err(invalid(SELECTION_SECTION, e.option(), &value, &e.to_string()));
        }
    }

    if let Some(section) = ini.section(Some(LOGGING_SECTION)) {
        if let Some(v) = non_empty(section.get("directory")) {
            config.logging.directory = PathBuf::from(v);
        }
        if let Some(v) = non_empty(section.get("file")) {
            config.logging.file = v;
        }
    }

    Ok(config)
}

fn to_ini(config: &ConfigFile) -> Ini {
    let selection = &config.selection;
    let mut ini = Ini::new();

    ini.with_section(Some(SELECTION_SECTION))
        .set("backstop", selection.backstop.to_string())
        .set("coverage_count", selection.coverage_count.to_string())
        .set("max_selections", optional(selection.max_selections))
        .set("minclouds", selection.minclouds.to_string())
        .set("max_uncovered", selection.max_uncovered.to_string())
        .set(
            "name_regexp",
            selection.name_regexp.clone().unwrap_or_default(),
        )
        .set(
            "date_regexp",
            selection.date_regexp.clone().unwrap_or_default(),
        )
        .set("max_iterations", optional(selection.max_iterations))
        .set(
            "time_budget_secs",
            optional(selection.time_budget.map(|d| d.as_secs_f64())),
        );

    ini.with_section(Some(LOGGING_SECTION))
        .set("directory", config.logging.directory.display().to_string())
        .set("file", config.logging.file.clone());

    ini
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Parse an optional numeric key. Absent or empty values are `None`.
fn parse_number<T: FromStr>(section: &Properties, key: &str) -> Result<Option<T>, ConfigFileError> {
    match non_empty(section.get(key)) {
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(SELECTION_SECTION, key, &v, "expected a number")),
        None => Ok(None),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
