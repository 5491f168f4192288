//! Pre-selection scene filters.

use regex::Regex;

use super::{CatalogEntry, Scene};
use crate::config::{ConfigError, SelectionConfig};

/// Cloud, name and date predicates applied before selection.
///
/// Predicates are applied in a fixed order (cloud, name, date) and keep
/// the relative order of the input. Running a filter over its own output
/// changes nothing.
#[derive(Debug, Clone)]
pub struct SceneFilter {
    minclouds: f64,
    name_pattern: Option<Regex>,
    date_pattern: Option<Regex>,
}

impl Default for SceneFilter {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl SceneFilter {
    /// Filter with only the cloud lower bound.
    pub fn new(minclouds: f64) -> Self {
        Self {
            minclouds,
            name_pattern: None,
            date_pattern: None,
        }
    }

    /// Build the filter described by a selection config.
    pub fn from_config(config: &SelectionConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            minclouds: config.minclouds,
            name_pattern: config.name_pattern()?,
            date_pattern: config.date_pattern()?,
        })
    }

    /// Keep only scenes whose name matches `pattern`.
    pub fn with_name_pattern(mut self, pattern: Regex) -> Self {
        self.name_pattern = Some(pattern);
        self
    }

    /// Keep only scenes whose `createdAt` matches `pattern`.
    pub fn with_date_pattern(mut self, pattern: Regex) -> Self {
        self.date_pattern = Some(pattern);
        self
    }

    /// Whether an entry passes every predicate.
    ///
    /// The cloud check keeps scenes at or above `minclouds`. Patterns match
    /// anywhere in the field; a scene without the field never matches.
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        if entry.cloud_fraction() < self.minclouds {
            return false;
        }
        if let Some(pattern) = &self.name_pattern {
            if !entry.name().is_some_and(|name| pattern.is_match(name)) {
                return false;
            }
        }
        if let Some(pattern) = &self.date_pattern {
            if !entry
                .created_at()
                .is_some_and(|created_at| pattern.is_match(created_at))
            {
                return false;
            }
        }
        true
    }

    /// Drop entries that fail any predicate, preserving order.
    pub fn retain(&self, mut entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
        entries.retain(|entry| self.matches(entry));
        entries
    }

    /// Filter entries and decode footprints for the survivors.
    pub fn apply(&self, entries: Vec<CatalogEntry>) -> Vec<Scene> {
        let total = entries.len();
        let scenes: Vec<Scene> = self
            .retain(entries)
            .into_iter()
            .map(CatalogEntry::into_scene)
            .collect();

        tracing::debug!(
            total,
            retained = scenes.len(),
            minclouds = self.minclouds,
            "Filtered scene catalog"
        );

        scenes
    }
}
