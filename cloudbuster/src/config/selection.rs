//! In-memory selection settings.

use std::time::Duration;

use regex::Regex;
use thiserror::Error;

/// Default number of parallel primary coverage layers.
pub const DEFAULT_COVERAGE_COUNT: usize = 3;

/// Default uncovered-area tolerance, in the AOI's area units.
pub const DEFAULT_MAX_UNCOVERED: f64 = 5e-4;

/// Default lower bound on scene cloud percentage.
pub const DEFAULT_MINCLOUDS: f64 = 0.0;

/// Errors raised by [`SelectionConfig::validate`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric option is out of range.
    #[error("Invalid value for {option}: {value} ({reason})")]
    InvalidValue {
        option: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A filter pattern is not a valid regular expression.
    #[error("Invalid {option} pattern: {source}")]
    InvalidPattern {
        option: &'static str,
        #[source]
        source: regex::Error,
    },
}

impl ConfigError {
    /// Name of the offending option.
    pub fn option(&self) -> &'static str {
        match self {
            ConfigError::InvalidValue { option, .. } => option,
            ConfigError::InvalidPattern { option, .. } => option,
        }
    }
}

/// Settings for one selection run.
///
/// Defaults to three primary layers with the backstop enabled, no
/// selection cap and a `5e-4` area tolerance.
///
/// # Example
///
/// ```
/// use cloudbuster::config::SelectionConfig;
///
/// let config = SelectionConfig::default()
///     .with_coverage_count(1)
///     .with_max_selections(4)
///     .with_name_regexp("^S2B");
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.coverage_count, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    /// Run the backstop phase over leftover scenes.
    pub backstop: bool,

    /// Number of parallel primary layers.
    pub coverage_count: usize,

    /// Cap on selections across both phases.
    pub max_selections: Option<usize>,

    /// Drop scenes whose cloud percentage is below this value.
    ///
    /// This is a lower bound, applied as written. It has not been audited
    /// for the intended semantics.
    pub minclouds: f64,

    /// A layer counts as covered once its remaining area is at most this.
    pub max_uncovered: f64,

    /// Keep only scenes whose name matches.
    pub name_regexp: Option<String>,

    /// Keep only scenes whose `createdAt` matches.
    pub date_regexp: Option<String>,

    /// Cap on greedy iterations across both phases.
    pub max_iterations: Option<usize>,

    /// Wall-clock budget for the whole run.
    pub time_budget: Option<Duration>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            backstop: true,
            coverage_count: DEFAULT_COVERAGE_COUNT,
            max_selections: None,
            minclouds: DEFAULT_MINCLOUDS,
            max_uncovered: DEFAULT_MAX_UNCOVERED,
            name_regexp: None,
            date_regexp: None,
            max_iterations: None,
            time_budget: None,
        }
    }
}

impl SelectionConfig {
    /// Enable or disable the backstop phase.
    pub fn with_backstop(mut self, backstop: bool) -> Self {
        self.backstop = backstop;
        self
    }

    /// Set the number of primary layers.
    pub fn with_coverage_count(mut self, count: usize) -> Self {
        self.coverage_count = count;
        self
    }

    /// Cap the number of selections.
    pub fn with_max_selections(mut self, max: usize) -> Self {
        self.max_selections = Some(max);
        self
    }

    /// Set the minimum cloud percentage.
    pub fn with_minclouds(mut self, minclouds: f64) -> Self {
        self.minclouds = minclouds;
        self
    }

    /// Set the uncovered-area tolerance.
    pub fn with_max_uncovered(mut self, max_uncovered: f64) -> Self {
        self.max_uncovered = max_uncovered;
        self
    }

    /// Filter scenes by name.
    pub fn with_name_regexp(mut self, pattern: impl Into<String>) -> Self {
        self.name_regexp = Some(pattern.into());
        self
    }

    /// Filter scenes by acquisition timestamp.
    pub fn with_date_regexp(mut self, pattern: impl Into<String>) -> Self {
        self.date_regexp = Some(pattern.into());
        self
    }

    /// Bound the number of greedy iterations.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Bound the wall-clock time of a run.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Check option ranges and compile the filter patterns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_uncovered.is_finite() || self.max_uncovered < 0.0 {
            return Err(ConfigError::InvalidValue {
                option: "max_uncovered",
                value: self.max_uncovered.to_string(),
                reason: "must be a finite, non-negative area",
            });
        }
        if !self.minclouds.is_finite() {
            return Err(ConfigError::InvalidValue {
                option: "minclouds",
                value: self.minclouds.to_string(),
                reason: "must be a finite percentage",
            });
        }
        self.name_pattern()?;
        self.date_pattern()?;
        Ok(())
    }

    /// Compiled name pattern, if configured.
    pub fn name_pattern(&self) -> Result<Option<Regex>, ConfigError> {
        compile("name_regexp", self.name_regexp.as_deref())
    }

    /// Compiled date pattern, if configured.
    pub fn date_pattern(&self) -> Result<Option<Regex>, ConfigError> {
        compile("date_regexp", self.date_regexp.as_deref())
    }
}

fn compile(option: &'static str, pattern: Option<&str>) -> Result<Option<Regex>, ConfigError> {
    pattern
        .map(|p| Regex::new(p).map_err(|source| ConfigError::InvalidPattern { option, source }))
        .transpose()
}
