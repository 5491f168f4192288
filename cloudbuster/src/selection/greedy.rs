//! The greedy maximum-coverage pass shared by both phases.
//!
//! Each iteration scores every remaining scene against every layer of the
//! pass and takes the single best (scene, layer) pair:
//!
//! ```text
//! score(r, j) = intersection_area(r.footprint, L[j]) * (1 - r.cloud_fraction / 100)
//! ```
//!
//! Scores are recomputed from scratch every iteration because layers change
//! after each pick. A run is therefore `O(|R|^2 * layers)` polygon
//! intersections in the worst case, which keeps practical catalogs in the
//! hundreds of scenes.

use super::budget::RunBudget;
use super::layer::{total_remaining_area, CoverageLayer};
use super::{Phase, PhaseSummary, SelectionRecord, Termination};
use crate::catalog::Scene;

/// Best (scene, layer) pair of one scoring pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub scene_index: usize,
    pub layer_index: usize,
    pub score: f64,
}

/// Find the pair with the strictly greatest positive score.
///
/// Scenes are visited in catalog order and layers in index order, and only
/// a strictly better score replaces the current best, so ties go to the
/// lowest scene index and then the lowest layer index. Returns `None` when
/// nothing scores above zero.
pub(crate) fn best_candidate(remaining: &[Scene], layers: &[CoverageLayer]) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    let mut best_score = 0.0;

    for (scene_index, scene) in remaining.iter().enumerate() {
        for (layer_index, layer) in layers.iter().enumerate() {
            let score = layer.weighted_score(scene);
            if score > best_score {
                best_score = score;
                best = Some(Candidate {
                    scene_index,
                    layer_index,
                    score,
                });
            }
        }
    }

    best
}

/// Run one greedy pass until a terminal condition fires.
///
/// Terminal conditions are checked before each iteration in this order:
/// coverage reached, selection cap, empty catalog, iteration or time
/// budget. A pass whose best score is not positive stops as stalled.
/// Selected scenes move from `remaining` to `selections`.
pub(crate) fn run_pass(
    phase: Phase,
    layers: &mut [CoverageLayer],
    remaining: &mut Vec<Scene>,
    selections: &mut Vec<SelectionRecord>,
    budget: &mut RunBudget,
    max_uncovered: f64,
) -> PhaseSummary {
    let mut iterations = 0;
    let mut selected = 0;

    let termination = loop {
        let uncovered = total_remaining_area(layers);
        if uncovered <= max_uncovered {
            break Termination::Covered;
        }
        if budget.selections_exhausted(selections.len()) {
            break Termination::SelectionCap;
        }
        if remaining.is_empty() {
            break Termination::CatalogExhausted;
        }
        if let Some(limit) = budget.run_limit() {
            break limit;
        }

        budget.record_iteration();
        iterations += 1;

        let Some(best) = best_candidate(remaining, layers) else {
            break Termination::Stalled;
        };

        let scene = remaining.remove(best.scene_index);
        let layer = &mut layers[best.layer_index];
        let before = layer.remaining_area();
        layer.subtract(scene.footprint());

        tracing::debug!(
            phase = %phase,
            scene = scene.index(),
            layer = best.layer_index,
            score = best.score,
            cloud = scene.cloud_fraction(),
            layer_area_before = before,
            layer_area_after = layer.remaining_area(),
            uncovered_before = uncovered,
            "Selected scene"
        );

        selections.push(SelectionRecord::new(
            scene.into_entry(),
            phase == Phase::Backstop,
        ));
        selected += 1;
    };

    let summary = PhaseSummary {
        phase,
        termination,
        remaining_area: total_remaining_area(layers),
        iterations,
        selected,
    };

    tracing::info!(
        phase = %phase,
        termination = %summary.termination,
        remaining_area = summary.remaining_area,
        selected = summary.selected,
        iterations = summary.iterations,
        "Selection phase finished"
    );

    summary
}
