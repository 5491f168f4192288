//! Candidate scenes.

use serde_json::{Map, Value};

use super::{CatalogError, CatalogResult};
use crate::geometry::{self, Footprint};

/// Metadata key holding the nested scene metadata object.
const SCENE_METADATA_KEY: &str = "sceneMetadata";
/// Cloud percentage key inside `sceneMetadata`.
const CLOUD_PERCENTAGE_KEY: &str = "cloudyPixelPercentage";
/// Scene name key, also read from selection records.
pub(crate) const NAME_KEY: &str = "name";
const CREATED_AT_KEY: &str = "createdAt";
const FOOTPRINT_KEY: &str = "dataFootprint";

/// A catalog result before its footprint has been decoded.
///
/// Filters run against entries so footprints are only parsed for scenes
/// that survive filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    index: usize,
    metadata: Map<String, Value>,
    cloud_fraction: f64,
}

impl CatalogEntry {
    /// Create an entry with an explicit cloud fraction.
    pub fn new(index: usize, metadata: Map<String, Value>, cloud_fraction: f64) -> Self {
        Self {
            index,
            metadata,
            cloud_fraction,
        }
    }

    /// Create an entry from a raw result, reading the cloud percentage
    /// from `sceneMetadata.cloudyPixelPercentage`.
    ///
    /// The percentage may be a JSON number or a numeric string.
    pub fn from_metadata(index: usize, metadata: Map<String, Value>) -> CatalogResult<Self> {
        let raw = metadata
            .get(SCENE_METADATA_KEY)
            .and_then(|m| m.get(CLOUD_PERCENTAGE_KEY));

        let parsed = match raw {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match parsed {
            Some(cloud_fraction) if cloud_fraction.is_finite() => {
                Ok(Self::new(index, metadata, cloud_fraction))
            }
            _ => Err(CatalogError::InvalidCloudCover {
                index,
                value: raw
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "missing".to_string()),
            }),
        }
    }

    /// Position of this scene in the original results list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Percentage of the scene obscured by cloud (0-100).
    pub fn cloud_fraction(&self) -> f64 {
        self.cloud_fraction
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.get(NAME_KEY).and_then(Value::as_str)
    }

    /// Acquisition timestamp string (`createdAt`).
    pub fn created_at(&self) -> Option<&str> {
        self.metadata.get(CREATED_AT_KEY).and_then(Value::as_str)
    }

    /// Every field of the original result.
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn into_metadata(self) -> Map<String, Value> {
        self.metadata
    }

    /// Decode `dataFootprint` and attach it.
    ///
    /// A missing or unreadable footprint becomes an empty shape: the scene
    /// stays in the catalog but can never score above zero.
    pub fn into_scene(self) -> Scene {
        let footprint = match self.metadata.get(FOOTPRINT_KEY) {
            Some(value) => match geometry::footprint_from_geojson(value) {
                Ok(footprint) => footprint,
                Err(e) => {
                    tracing::warn!(
                        index = self.index,
                        name = self.name().unwrap_or("<unnamed>"),
                        error = %e,
                        "Unreadable scene footprint, treating as empty"
                    );
                    geometry::empty()
                }
            },
            None => {
                tracing::warn!(
                    index = self.index,
                    name = self.name().unwrap_or("<unnamed>"),
                    "Scene has no dataFootprint, treating as empty"
                );
                geometry::empty()
            }
        };

        Scene::new(self, footprint)
    }
}

/// A candidate scene with its decoded footprint.
///
/// The footprint is decoded once and reused on every scoring pass.
#[derive(Debug, Clone)]
pub struct Scene {
    entry: CatalogEntry,
    footprint: Footprint,
}

impl Scene {
    pub fn new(entry: CatalogEntry, footprint: Footprint) -> Self {
        Self { entry, footprint }
    }

    pub fn entry(&self) -> &CatalogEntry {
        &self.entry
    }

    pub fn index(&self) -> usize {
        self.entry.index
    }

    pub fn cloud_fraction(&self) -> f64 {
        self.entry.cloud_fraction
    }

    /// Weight applied to raw overlap: `1 - cloud_fraction / 100`.
    pub fn clear_fraction(&self) -> f64 {
        1.0 - self.entry.cloud_fraction / 100.0
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    /// Drop the footprint and return the catalog entry.
    pub fn into_entry(self) -> CatalogEntry {
        self.entry
    }
}
