//! End-to-end selection tests.
//!
//! These tests drive the public API the way the scene-query and download
//! steps do: a JSON response goes in, a selection report comes out.
//!
//! Run with: `cargo test --test selection_scenarios`

use std::collections::HashSet;
use std::fs;

use serde_json::{json, Value};

use cloudbuster::catalog::SceneQueryResponse;
use cloudbuster::config::SelectionConfig;
use cloudbuster::output::{self, ArtifactKind};
use cloudbuster::selection::{select_scenes, SelectionError, SelectionOutcome, Termination};

// ============================================================================
// Helper Functions
// ============================================================================

/// GeoJSON polygon for an axis-aligned rectangle.
fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [min_x, min_y], [max_x, min_y], [max_x, max_y], [min_x, max_y], [min_x, min_y]
        ]]
    })
}

/// A catalog result the way the scene query returns it.
fn scene(name: &str, footprint: Value, cloud: f64) -> Value {
    json!({
        "name": name,
        "createdAt": "2019-06-01T10:56:21.000Z",
        "sceneMetadata": { "cloudyPixelPercentage": cloud },
        "dataFootprint": footprint,
        "sceneType": "Avro"
    })
}

fn response(scenes: Vec<Value>) -> SceneQueryResponse {
    serde_json::from_value(json!({
        "results": scenes,
        "aoi": rect(0.0, 0.0, 1.0, 1.0),
    }))
    .unwrap()
}

fn names(outcome: &SelectionOutcome) -> Vec<String> {
    outcome
        .selections()
        .iter()
        .map(|s| s.name().unwrap_or_default().to_string())
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

/// One clear scene that exactly covers the AOI is all that is needed.
#[test]
fn test_single_exact_cover() {
    let config = SelectionConfig::default().with_coverage_count(1);
    let outcome = select_scenes(
        response(vec![scene("exact", rect(0.0, 0.0, 1.0, 1.0), 0.0)]),
        &config,
    )
    .unwrap();

    assert_eq!(names(&outcome), vec!["exact"]);
    assert!(!outcome.not_covered);
    assert_eq!(outcome.primary.termination, Termination::Covered);
    // Nothing left for the backstop layer
    assert_eq!(outcome.backstop.termination, Termination::CatalogExhausted);
    assert!(outcome.not_backstopped);
}

/// The clear half wins over the cloudy half even when listed second.
#[test]
fn test_clear_half_selected_before_cloudy_half() {
    let outcome = select_scenes(
        response(vec![
            scene("cloudy-left", rect(0.0, 0.0, 0.5, 1.0), 50.0),
            scene("clear-right", rect(0.5, 0.0, 1.0, 1.0), 0.0),
        ]),
        &SelectionConfig::default(),
    )
    .unwrap();

    assert_eq!(names(&outcome), vec!["clear-right", "cloudy-left"]);
    assert!(outcome.selections().iter().all(|s| !s.is_backstop()));
}

/// Equal raw overlap: the clear scene wins over the cloudy one.
#[test]
fn test_clear_scene_wins_equal_overlap() {
    let config = SelectionConfig::default().with_coverage_count(1);
    let outcome = select_scenes(
        response(vec![
            scene("cloudy", rect(0.0, 0.0, 0.5, 1.0), 50.0),
            scene("clear", rect(0.0, 0.0, 0.5, 1.0), 0.0),
        ]),
        &config,
    )
    .unwrap();

    assert_eq!(outcome.selections()[0].name(), Some("clear"));
}

#[test]
fn test_empty_catalog() {
    let outcome = select_scenes(response(Vec::new()), &SelectionConfig::default()).unwrap();

    assert!(outcome.selections().is_empty());
    assert!(outcome.not_covered);
    assert!(outcome.not_backstopped);
    assert_eq!(outcome.primary.termination, Termination::CatalogExhausted);
    assert_eq!(outcome.report.bounds.max_x, 1.0);
}

#[test]
fn test_selection_cap_of_one() {
    let config = SelectionConfig::default().with_max_selections(1);
    let outcome = select_scenes(
        response(vec![
            scene("first", rect(0.0, 0.0, 1.0 / 3.0, 1.0), 0.0),
            scene("second", rect(1.0 / 3.0, 0.0, 2.0 / 3.0, 1.0), 0.0),
            scene("third", rect(2.0 / 3.0, 0.0, 1.0, 1.0), 0.0),
        ]),
        &config,
    )
    .unwrap();

    // The thirds score within rounding of each other, so only the count is fixed
    assert_eq!(outcome.selections().len(), 1);
    assert!(outcome.not_covered);
    assert_eq!(outcome.primary.termination, Termination::SelectionCap);
    assert_eq!(outcome.backstop.termination, Termination::SelectionCap);
}

#[test]
fn test_backstop_disabled() {
    let config = SelectionConfig::default()
        .with_backstop(false)
        .with_coverage_count(2);
    let outcome = select_scenes(
        response(vec![
            scene("a", rect(0.0, 0.0, 0.5, 1.0), 10.0),
            scene("b", rect(0.0, 0.0, 0.5, 1.0), 20.0),
            scene("c", rect(0.0, 0.0, 0.5, 1.0), 30.0),
        ]),
        &config,
    )
    .unwrap();

    assert!(outcome.not_covered);
    assert!(outcome.not_backstopped);
    assert!(!outcome.backstop_enabled);
    assert_eq!(outcome.backstop.termination, Termination::Disabled);
    assert!(outcome.selections().iter().all(|s| !s.is_backstop()));
    // Primary stopped as soon as no scene added area to either layer
    assert_eq!(names(&outcome), vec!["a", "b"]);
    assert_eq!(outcome.primary.termination, Termination::Stalled);
}

/// Leftover scenes build the backstop layer and carry the flag.
#[test]
fn test_backstop_uses_leftovers() {
    let config = SelectionConfig::default().with_coverage_count(1);
    let outcome = select_scenes(
        response(vec![
            scene("spare", rect(0.0, 0.0, 1.0, 1.0), 30.0),
            scene("best", rect(0.0, 0.0, 1.0, 1.0), 5.0),
            scene("outside", rect(4.0, 4.0, 5.0, 5.0), 0.0),
        ]),
        &config,
    )
    .unwrap();

    assert_eq!(names(&outcome), vec!["best", "spare"]);
    assert!(!outcome.selections()[0].is_backstop());
    assert!(outcome.selections()[1].is_backstop());
    assert!(!outcome.not_covered);
    assert!(!outcome.not_backstopped);
    assert!(outcome.is_complete());

    let report = serde_json::to_value(&outcome.report).unwrap();
    assert_eq!(report["bounds"], json!([0.0, 0.0, 1.0, 1.0]));
    assert_eq!(report["selections"][1]["backstop"], json!(true));
    assert!(report["selections"][0].get("backstop").is_none());
    // Original metadata passes through untouched
    assert_eq!(report["selections"][0]["sceneType"], json!("Avro"));
    assert!(report["selections"][0].get("dataFootprint").is_some());
}

/// `minclouds` is a lower bound: clearer scenes are dropped.
#[test]
fn test_minclouds_drops_clear_scenes() {
    let config = SelectionConfig::default()
        .with_coverage_count(1)
        .with_minclouds(10.0);
    let outcome = select_scenes(
        response(vec![
            scene("clear", rect(0.0, 0.0, 1.0, 1.0), 0.0),
            scene("hazy", rect(0.0, 0.0, 1.0, 1.0), 10.0),
        ]),
        &config,
    )
    .unwrap();

    assert_eq!(names(&outcome), vec!["hazy"]);
}

#[test]
fn test_name_and_date_filters() {
    let mut later = scene("S2B_late", rect(0.0, 0.0, 1.0, 1.0), 0.0);
    later["createdAt"] = json!("2020-01-01T00:00:00.000Z");

    let config = SelectionConfig::default()
        .with_coverage_count(1)
        .with_name_regexp("^S2B")
        .with_date_regexp("^2019");
    let outcome = select_scenes(
        response(vec![
            scene("S2A_early", rect(0.0, 0.0, 1.0, 1.0), 0.0),
            later,
            scene("S2B_early", rect(0.0, 0.0, 1.0, 1.0), 40.0),
        ]),
        &config,
    )
    .unwrap();

    assert_eq!(names(&outcome), vec!["S2B_early"]);
}

#[test]
fn test_invalid_aoi_is_rejected() {
    let response: SceneQueryResponse = serde_json::from_value(json!({
        "results": [],
        "aoi": { "type": "Point", "coordinates": [0.0, 0.0] }
    }))
    .unwrap();

    let result = select_scenes(response, &SelectionConfig::default());
    assert!(matches!(result, Err(SelectionError::Catalog(_))));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = SelectionConfig::default().with_name_regexp("(");
    let result = select_scenes(response(Vec::new()), &config);
    assert!(matches!(result, Err(SelectionError::Config(_))));
}

#[test]
fn test_time_budget_zero_stops_before_selecting() {
    let config = SelectionConfig::default().with_time_budget(std::time::Duration::ZERO);
    let outcome = select_scenes(
        response(vec![scene("a", rect(0.0, 0.0, 1.0, 1.0), 0.0)]),
        &config,
    )
    .unwrap();

    assert!(outcome.selections().is_empty());
    assert_eq!(outcome.primary.termination, Termination::TimeBudget);
    assert!(outcome.not_covered);
}

/// Full file round trip: response on disk in, selection report on disk out.
#[test]
fn test_file_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = dir.path().join("response.json");
    let output_path = dir.path().join("selection.json");

    let body = json!({
        "results": [
            scene("left", rect(0.0, 0.0, 0.7, 1.0), 0.0),
            scene("right", rect(0.4, 0.0, 1.0, 1.0), 0.0),
            scene("spare", rect(0.0, 0.0, 1.0, 1.0), 60.0),
        ],
        "aoi": rect(0.0, 0.0, 1.0, 1.0),
    });
    fs::write(&input, serde_json::to_string(&body).unwrap()).unwrap();

    let config = SelectionConfig::default().with_coverage_count(1);
    let response = SceneQueryResponse::from_path(&input).unwrap();
    let outcome = select_scenes(response, &config).unwrap();
    let written = output::write_outcome(&outcome, &output_path).unwrap();

    assert_eq!(written.kind, ArtifactKind::Selection);
    let report: Value = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    let selected: Vec<&str> = report["selections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(selected, vec!["left", "right", "spare"]);
}

#[test]
fn test_incomplete_run_writes_error_artifact() {
    let dir = tempfile::TempDir::new().unwrap();
    let output_path = dir.path().join("selection.json");

    let outcome = select_scenes(
        response(vec![scene("half", rect(0.0, 0.0, 0.5, 1.0), 0.0)]),
        &SelectionConfig::default(),
    )
    .unwrap();
    let written = output::write_outcome(&outcome, &output_path).unwrap();

    assert_eq!(written.kind, ArtifactKind::Error);
    assert!(!output_path.exists());
    assert!(output::error_artifact_path(&output_path).exists());
}

// ============================================================================
// Properties
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// (min_x, min_y, width, height, cloud) for one random scene.
    fn scene_strategy() -> impl Strategy<Value = (f64, f64, f64, f64, f64)> {
        (
            -0.25..1.0_f64,
            -0.25..1.0_f64,
            0.05..1.0_f64,
            0.05..1.0_f64,
            0.0..=100.0_f64,
        )
    }

    fn build(scenes: &[(f64, f64, f64, f64, f64)]) -> SceneQueryResponse {
        response(
            scenes
                .iter()
                .enumerate()
                .map(|(i, (x, y, w, h, cloud))| {
                    scene(&format!("scene-{}", i), rect(*x, *y, x + w, y + h), *cloud)
                })
                .collect(),
        )
    }

    fn config(coverage_count: usize, max_selections: Option<usize>, backstop: bool) -> SelectionConfig {
        let config = SelectionConfig::default()
            .with_coverage_count(coverage_count)
            .with_backstop(backstop);
        match max_selections {
            Some(max) => config.with_max_selections(max),
            None => config,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn test_no_duplicates_and_cap_respected(
            scenes in proptest::collection::vec(scene_strategy(), 0..10),
            coverage_count in 0usize..4,
            max_selections in proptest::option::of(0usize..6),
            backstop in any::<bool>(),
        ) {
            let config = config(coverage_count, max_selections, backstop);
            let outcome = select_scenes(build(&scenes), &config).unwrap();

            let indices: Vec<usize> = outcome.selections().iter().map(|s| s.index()).collect();
            let unique: HashSet<usize> = indices.iter().copied().collect();
            prop_assert_eq!(unique.len(), indices.len());

            if let Some(max) = max_selections {
                prop_assert!(outcome.selections().len() <= max);
            }
            prop_assert_eq!(
                outcome.selections().len(),
                outcome.primary.selected + outcome.backstop.selected
            );
            if !backstop {
                prop_assert!(outcome.not_backstopped);
                prop_assert!(outcome.selections().iter().all(|s| !s.is_backstop()));
            }
        }

        #[test]
        fn test_selection_is_deterministic(
            scenes in proptest::collection::vec(scene_strategy(), 0..10),
            coverage_count in 1usize..4,
        ) {
            let config = config(coverage_count, None, true);
            let first = select_scenes(build(&scenes), &config).unwrap();
            let second = select_scenes(build(&scenes), &config).unwrap();

            prop_assert_eq!(
                output::to_pretty_json(&first.report).unwrap(),
                output::to_pretty_json(&second.report).unwrap()
            );
            prop_assert_eq!(first.not_covered, second.not_covered);
            prop_assert_eq!(first.not_backstopped, second.not_backstopped);
        }

        /// Each extra iteration can only shrink the uncovered area.
        #[test]
        fn test_uncovered_area_never_grows(
            scenes in proptest::collection::vec(scene_strategy(), 1..8),
            coverage_count in 1usize..3,
        ) {
            let mut previous = f64::INFINITY;
            for iterations in 0..=scenes.len() {
                let config = config(coverage_count, None, false).with_max_iterations(iterations);
                let outcome = select_scenes(build(&scenes), &config).unwrap();
                let area = outcome.primary.remaining_area;
                prop_assert!(
                    area <= previous + 1e-9,
                    "uncovered area grew from {} to {} at {} iterations",
                    previous, area, iterations
                );
                previous = area;
            }
        }

        /// Same for the backstop layer, sweeping through both phases.
        #[test]
        fn test_backstop_area_never_grows(
            scenes in proptest::collection::vec(scene_strategy(), 1..8),
        ) {
            let mut previous = f64::INFINITY;
            // One primary layer, so the backstop has leftovers to work with
            for iterations in 0..=2 * scenes.len() + 1 {
                let config = config(1, None, true).with_max_iterations(iterations);
                let outcome = select_scenes(build(&scenes), &config).unwrap();
                let area = outcome.backstop.remaining_area;
                prop_assert!(
                    area <= previous + 1e-9,
                    "backstop area grew from {} to {} at {} iterations",
                    previous, area, iterations
                );
                previous = area;
            }
        }
    }
}
