//! Scene catalog: input decoding, candidate scenes and pre-selection filters.
//!
//! The catalog arrives as the JSON record produced by the scene-query step:
//!
//! ```text
//! { "results": [ { "dataFootprint": {..}, "sceneMetadata": { "cloudyPixelPercentage": 12.5 },
//!                  "name": "...", "createdAt": "...", ... }, ... ],
//!   "aoi": {..} }
//! ```
//!
//! Every field of a result is carried through untouched so it can be handed
//! back to the download step. Only the cloud percentage, `name`, `createdAt`
//! and `dataFootprint` are ever read.

mod filter;
mod response;
mod scene;

pub use filter::SceneFilter;
pub use response::{Catalog, SceneQueryResponse};
pub use scene::{CatalogEntry, Scene};

pub(crate) use scene::NAME_KEY;

use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::GeometryError;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while loading a scene catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The input is not the expected JSON record.
    #[error("Invalid scene query response: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read the input file.
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The AOI could not be used as a coverage target.
    #[error("Invalid area of interest: {0}")]
    InvalidAoi(#[source] GeometryError),

    /// A scene has no usable cloud percentage.
    #[error("Scene {index} has an invalid cloudyPixelPercentage: {value}")]
    InvalidCloudCover { index: usize, value: String },
}
