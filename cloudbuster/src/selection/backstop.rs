//! Single-layer fallback coverage over leftover scenes.

use super::budget::RunBudget;
use super::greedy;
use super::layer::CoverageLayer;
use super::{Phase, PhaseSummary, SelectionRecord, Termination};
use crate::catalog::Scene;
use crate::geometry::AreaOfInterest;

/// Covers one fresh copy of the AOI with whatever the primary phase left.
///
/// The backstop layer ignores what the primary layers already covered.
/// Scenes it picks are flagged `backstop` in the output.
#[derive(Debug, Clone)]
pub(crate) struct BackstopSelector {
    layer: CoverageLayer,
    max_uncovered: f64,
}

impl BackstopSelector {
    pub(crate) fn new(aoi: &AreaOfInterest, max_uncovered: f64) -> Self {
        Self {
            layer: CoverageLayer::new(aoi),
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
            Phase::Backstop,
            std::slice::from_mut(&mut self.layer),
            remaining,
            selections,
            budget,
            self.max_uncovered,
        )
    }

    /// Summary for a run with the backstop switched off.
    pub(crate) fn disabled(&self) -> PhaseSummary {
        PhaseSummary {
            phase: Phase::Backstop,
            termination: Termination::Disabled,
            remaining_area: self.layer.remaining_area(),
            iterations: 0,
            selected: 0,
        }
    }
}
