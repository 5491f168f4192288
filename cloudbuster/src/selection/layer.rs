//! Uncovered-area trackers.

use crate::catalog::Scene;
use crate::geometry::{self, AreaOfInterest, Footprint};

/// The still-uncovered remainder of the AOI for one coverage attempt.
///
/// Starts as a copy of the AOI and only ever shrinks: each selected
/// footprint is subtracted and the result replaces the previous remainder.
#[derive(Debug, Clone)]
pub(crate) struct CoverageLayer {
    uncovered: Footprint,
    area: f64,
}

impl CoverageLayer {
    /// A fresh layer covering nothing yet.
    pub(crate) fn new(aoi: &AreaOfInterest) -> Self {
        Self {
            uncovered: aoi.shape().clone(),
            area: aoi.area(),
        }
    }

    /// Area still to be covered.
    pub(crate) fn remaining_area(&self) -> f64 {
        self.area
    }

    /// Overlap with the scene, scaled by the scene's clear fraction.
    pub(crate) fn weighted_score(&self, scene: &Scene) -> f64 {
        geometry::intersection_area(scene.footprint(), &self.uncovered) * scene.clear_fraction()
    }

    /// Mark the footprint as covered.
    pub(crate) fn subtract(&mut self, footprint: &Footprint) {
        let uncovered = geometry::difference(&self.uncovered, footprint);
        self.area = geometry::area(&uncovered);
        self.uncovered = uncovered;
    }
}

/// Sum of remaining areas across layers.
pub(crate) fn total_remaining_area(layers: &[CoverageLayer]) -> f64 {
    layers.iter().map(CoverageLayer::remaining_area).sum()
}
