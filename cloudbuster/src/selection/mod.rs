//! Coverage selection: pick low-cloud scenes that cover the AOI.
//!
//! A run has two phases over one working list of candidate scenes:
//!
//! 1. **Primary**: `coverage_count` independent layers, each a copy of the
//!    AOI, are covered greedily. Each iteration takes the (scene, layer)
//!    pair with the greatest cloud-weighted overlap.
//! 2. **Backstop**: if enabled, one more fresh AOI layer is covered from
//!    whatever scenes the primary phase left.
//!
//! A selected scene leaves the working list, so no scene is picked twice.
//! Partial coverage is not an error: the [`SelectionOutcome`] always holds
//! the best-effort selection plus the `not_covered` / `not_backstopped`
//! flags and the reason each phase stopped.
//!
//! ```text
//! SceneQueryResponse ──► SceneFilter ──► CoverageSelector ──► BackstopSelector ──► SelectionOutcome
//!                        (clouds, name,   (k layers)           (1 layer, leftovers)   (bounds, selections,
//!                         date)                                                        flags)
//! ```
//!
//! # Example
//!
//! ```
//! use cloudbuster::catalog::SceneQueryResponse;
//! use cloudbuster::config::SelectionConfig;
//! use cloudbuster::selection::select_scenes;
//!
//! let response = SceneQueryResponse::from_json_str(r#"{
//!     "results": [{
//!         "name": "S2A_T31UDQ",
//!         "createdAt": "2019-06-01T10:56:21Z",
//!         "sceneMetadata": { "cloudyPixelPercentage": 3.5 },
//!         "dataFootprint": { "type": "Polygon",
//!             "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]] }
//!     }],
//!     "aoi": { "type": "Polygon",
//!         "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]] }
//! }"#)?;
//!
//! let config = SelectionConfig::default().with_coverage_count(1);
//! let outcome = select_scenes(response, &config)?;
//!
//! assert_eq!(outcome.selections().len(), 1);
//! assert!(!outcome.not_covered);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod backstop;
mod budget;
mod coverage;
mod greedy;
mod layer;
mod outcome;

pub use outcome::{
    Phase, PhaseSummary, SelectionOutcome, SelectionRecord, SelectionReport, Termination,
};

use thiserror::Error;

use backstop::BackstopSelector;
use budget::RunBudget;
use coverage::CoverageSelector;

use crate::catalog::{CatalogError, Scene, SceneFilter, SceneQueryResponse};
use crate::config::{ConfigError, SelectionConfig};
use crate::geometry::AreaOfInterest;

/// Errors that stop a selection run before it starts.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The input catalog or AOI is unusable.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The selection settings are invalid.
    #[error("Invalid selection config: {0}")]
    Config(#[from] ConfigError),
}

/// Filter a scene-query response and select scenes covering its AOI.
pub fn select_scenes(
    response: SceneQueryResponse,
    config: &SelectionConfig,
) -> Result<SelectionOutcome, SelectionError> {
    config.validate()?;
    let filter = SceneFilter::from_config(config)?;
    let catalog = response.into_catalog()?;
    let scenes = filter.apply(catalog.entries);

    select_from_scenes(&catalog.aoi, scenes, config)
}

/// Select from already filtered scenes, in the order given.
///
/// Name, date and cloud filters are not applied here.
pub fn select_from_scenes(
    aoi: &AreaOfInterest,
    scenes: Vec<Scene>,
    config: &SelectionConfig,
) -> Result<SelectionOutcome, SelectionError> {
    config.validate()?;

    tracing::info!(
        candidates = scenes.len(),
        aoi_area = aoi.area(),
        coverage_count = config.coverage_count,
        backstop = config.backstop,
        max_selections = ?config.max_selections,
        max_uncovered = config.max_uncovered,
        "Starting scene selection"
    );

    let mut remaining = scenes;
    let mut selections = Vec::new();
    let mut budget = RunBudget::new(config);

    let mut coverage = CoverageSelector::new(aoi, config.coverage_count, config.max_uncovered);
    let primary = coverage.run(&mut remaining, &mut selections, &mut budget);

    let mut backstop = BackstopSelector::new(aoi, config.max_uncovered);
    let backstop_summary = if config.backstop {
        backstop.run(&mut remaining, &mut selections, &mut budget)
    } else {
        backstop.disabled()
    };

    let outcome = SelectionOutcome::assemble(
        aoi,
        selections,
        primary,
        backstop_summary,
        config.max_uncovered,
        config.coverage_count,
    );

    if outcome.is_complete() {
        tracing::info!(
            selected = outcome.selections().len(),
            "Scene selection complete"
        );
    } else {
        tracing::warn!(
            selected = outcome.selections().len(),
            not_covered = outcome.not_covered,
            not_backstopped = outcome.not_backstopped,
            primary = %outcome.primary.termination,
            backstop = %outcome.backstop.termination,
            "Scene selection incomplete"
        );
    }

    Ok(outcome)
}
