//! The scene-query response record.

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CatalogEntry, CatalogError, CatalogResult};
use crate::geometry::AreaOfInterest;

/// Raw input record: candidate results plus the AOI geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneQueryResponse {
    /// Candidate scenes in query order.
    #[serde(default)]
    pub results: Vec<Map<String, Value>>,

    /// GeoJSON geometry of the area of interest.
    pub aoi: Value,
}

impl SceneQueryResponse {
    /// Parse a response from a JSON string.
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a response from a reader.
    pub fn from_reader<R: Read>(reader: R) -> CatalogResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load a response from a JSON file.
    pub fn from_path(path: &Path) -> CatalogResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Decode the AOI and every result's cloud percentage.
    pub fn into_catalog(self) -> CatalogResult<Catalog> {
        let aoi = AreaOfInterest::from_geojson(&self.aoi).map_err(CatalogError::InvalidAoi)?;

        let entries = self
            .results
            .into_iter()
            .enumerate()
            .map(|(index, metadata)| CatalogEntry::from_metadata(index, metadata))
            .collect::<CatalogResult<Vec<_>>>()?;

        tracing::debug!(
            scenes = entries.len(),
            aoi_area = aoi.area(),
            "Loaded scene catalog"
        );

        Ok(Catalog { aoi, entries })
    }
}

/// A decoded catalog: the AOI and its candidate entries in query order.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub aoi: AreaOfInterest,
    pub entries: Vec<CatalogEntry>,
}
