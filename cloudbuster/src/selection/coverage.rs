//! Primary multi-layer coverage.

use super::budget::RunBudget;
use super::greedy;
use super::layer::CoverageLayer;
use super::{Phase, PhaseSummary, SelectionRecord};
use crate::catalog::Scene;
use crate::geometry::AreaOfInterest;

/// Builds `coverage_count` independent cloud-minimizing layers over the AOI.
///
/// Every pick goes to whichever (scene, layer) pair gains the most clear
/// area, so a well-covered layer stops attracting scenes and effort spreads
/// across the layers. Downstream mosaicking can then choose between the
/// redundant layers.
#[derive(Debug, Clone)]
pub(crate) struct CoverageSelector {
    layers: Vec<CoverageLayer>,
    max_uncovered: f64,
}

impl CoverageSelector {
    pub(crate) fn new(aoi: &AreaOfInterest, coverage_count: usize, max_uncovered: f64) -> Self {
        Self {
            layers: (0..coverage_count).map(|_| CoverageLayer::new(aoi)).collect(),
            max_uncovered,
        }
    }

    pub(crate) fn run(
        &mut self,
        remaining: &mut Vec<Scene>,
        selections: &mut Vec<SelectionRecord>,
        budget: &mut RunBudget,
    ) -> PhaseSummary {
        greedy::run_pass(
            Phase::Primary,
            &mut self.layers,
            remaining,
            selections,
            budget,
            self.max_uncovered,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::config::SelectionConfig;
    use crate::geometry::test_shapes::{rect, unit_square};
    use crate::selection::layer::total_remaining_area;
    use crate::selection::Termination;
    use serde_json::Map;

    fn scene(index: usize, min_x: f64, max_x: f64, cloud: f64) -> Scene {
        Scene::new(
            CatalogEntry::new(index, Map::new(), cloud),
            rect(min_x, 0.0, max_x, 1.0),
        )
    }

    fn run(
        selector: &mut CoverageSelector,
        remaining: &mut Vec<Scene>,
        config: &SelectionConfig,
    ) -> (PhaseSummary, Vec<SelectionRecord>) {
        let mut selections = Vec::new();
        let mut budget = RunBudget::new(config);
        let summary = selector.run(remaining, &mut selections, &mut budget);
        (summary, selections)
    }

    #[test]
    fn test_layers_start_as_aoi() {
        let aoi = AreaOfInterest::new(unit_square()).unwrap();
        let selector = CoverageSelector::new(&aoi, 3, 5e-4);
        assert_eq!(selector.layers.len(), 3);
        assert!((total_remaining_area(&selector.layers) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_spreads_scenes_across_layers() {
        let aoi = AreaOfInterest::new(unit_square()).unwrap();
        let mut selector = CoverageSelector::new(&aoi, 2, 5e-4);
        let mut remaining = vec![
            scene(0, 0.0, 1.0, 0.0),
            scene(1, 0.0, 1.0, 10.0),
            scene(2, 0.0, 1.0, 20.0),
        ];

        let (summary, selections) = run(&mut selector, &mut remaining, &SelectionConfig::default());

        assert_eq!(summary.termination, Termination::Covered);
        let picked: Vec<usize> = selections.iter().map(SelectionRecord::index).collect();
        assert_eq!(picked, vec![0, 1]);
        assert!(selector.layers.iter().all(|l| l.remaining_area() < 1e-9));
        assert_eq!(remaining.len(), 1);
    }

    #[test]
    fn test_zero_layers_is_trivially_covered() {
        let aoi = AreaOfInterest::new(unit_square()).unwrap();
        let mut selector = CoverageSelector::new(&aoi, 0, 5e-4);
        let mut remaining = vec![scene(0, 0.0, 1.0, 0.0)];

        let (summary, selections) = run(&mut selector, &mut remaining, &SelectionConfig::default());

        assert_eq!(summary.termination, Termination::Covered);
        assert!(selections.is_empty());
        assert_eq!(summary.remaining_area, 0.0);
    }

    #[test]
    fn test_catalog_exhausted() {
        let aoi = AreaOfInterest::new(unit_square()).unwrap();
        let mut selector = CoverageSelector::new(&aoi, 1, 5e-4);
        let mut remaining = vec![scene(0, 0.0, 0.5, 0.0)];

        let (summary, selections) = run(&mut selector, &mut remaining, &SelectionConfig::default());

        assert_eq!(summary.termination, Termination::CatalogExhausted);
        assert_eq!(selections.len(), 1);
        assert!((summary.remaining_area - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_selection_cap() {
        let aoi = AreaOfInterest::new(unit_square()).unwrap();
        let mut selector = CoverageSelector::new(&aoi, 1, 5e-4);
        let mut remaining = vec![
            scene(0, 0.0, 0.25, 0.0),
            scene(1, 0.25, 0.5, 0.0),
            scene(2, 0.5, 0.75, 0.0),
        ];
        let config = SelectionConfig::default().with_max_selections(2);

        let (summary, selections) = run(&mut selector, &mut remaining, &config);

        assert_eq!(summary.termination, Termination::SelectionCap);
        assert_eq!(selections.len(), 2);
    }
}
