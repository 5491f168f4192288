//! Selection results and the output record handed to the download step.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::catalog::{CatalogEntry, NAME_KEY};
use crate::geometry::{AreaOfInterest, Bounds};

/// Which greedy pass produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The multi-layer primary coverage pass.
    Primary,
    /// The single-layer fallback pass over leftover scenes.
    Backstop,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Primary => write!(f, "primary"),
            Phase::Backstop => write!(f, "backstop"),
        }
    }
}

/// Why a phase stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// Remaining area is within the tolerance.
    Covered,
    /// The cumulative selection cap was reached.
    SelectionCap,
    /// No candidate scenes are left.
    CatalogExhausted,
    /// No remaining scene adds positive weighted overlap.
    Stalled,
    /// The iteration budget ran out.
    IterationBudget,
    /// The wall-clock budget ran out.
    TimeBudget,
    /// The phase was switched off.
    Disabled,
}

impl Termination {
    /// True only when the phase reached its coverage target.
    pub fn is_covered(&self) -> bool {
        matches!(self, Termination::Covered)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Termination::Covered => "covered",
            Termination::SelectionCap => "selection cap reached",
            Termination::CatalogExhausted => "catalog exhausted",
            Termination::Stalled => "stalled",
            Termination::IterationBudget => "iteration budget exhausted",
            Termination::TimeBudget => "time budget exhausted",
            Termination::Disabled => "disabled",
        };
        write!(f, "{}", s)
    }
}

/// How one phase ended.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSummary {
    pub phase: Phase,
    pub termination: Termination,
    /// Uncovered area left at exit (summed over layers for the primary phase).
    pub remaining_area: f64,
    /// Scoring passes run.
    pub iterations: usize,
    /// Scenes selected by this phase.
    pub selected: usize,
}

/// One selected scene.
///
/// Serializes as the scene's original fields, plus `"backstop": true` for
/// scenes picked by the backstop phase. Keys are written in sorted order.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRecord {
    index: usize,
    metadata: Map<String, Value>,
    backstop: bool,
}

impl SelectionRecord {
    pub fn new(entry: CatalogEntry, backstop: bool) -> Self {
        Self {
            index: entry.index(),
            metadata: entry.into_metadata(),
            backstop,
        }
    }

    /// Position of the scene in the original results list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.get(NAME_KEY).and_then(Value::as_str)
    }

    pub fn is_backstop(&self) -> bool {
        self.backstop
    }
}

impl Serialize for SelectionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let flag = Value::Bool(true);
        let mut fields: BTreeMap<&str, &Value> = self
            .metadata
            .iter()
            .map(|(key, value)| (key.as_str(), value))
            .collect();
        if self.backstop {
            fields.insert("backstop", &flag);
        }
        fields.serialize(serializer)
    }
}

/// The output record consumed by the download and mosaic step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionReport {
    /// AOI bounds as `[minx, miny, maxx, maxy]`.
    pub bounds: Bounds,
    /// Selected scenes in selection order.
    pub selections: Vec<SelectionRecord>,
}

/// Everything a selection run produces.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub report: SelectionReport,

    /// Primary layers still have more than `max_uncovered` left.
    pub not_covered: bool,

    /// The backstop layer has more than `max_uncovered` left.
    ///
    /// Always true when the backstop phase is disabled.
    pub not_backstopped: bool,

    pub primary: PhaseSummary,
    pub backstop: PhaseSummary,

    /// Whether the backstop phase was enabled for this run.
    pub backstop_enabled: bool,

    /// Number of primary layers used.
    pub coverage_count: usize,
}

impl SelectionOutcome {
    /// Package the phase results.
    pub(crate) fn assemble(
        aoi: &AreaOfInterest,
        selections: Vec<SelectionRecord>,
        primary: PhaseSummary,
        backstop: PhaseSummary,
        max_uncovered: f64,
        coverage_count: usize,
    ) -> Self {
        let backstop_enabled = backstop.termination != Termination::Disabled;
        let not_covered = primary.remaining_area > max_uncovered;
        let not_backstopped = !backstop_enabled || backstop.remaining_area > max_uncovered;

        Self {
            report: SelectionReport {
                bounds: aoi.bounds(),
                selections,
            },
            not_covered,
            not_backstopped,
            primary,
            backstop,
            backstop_enabled,
            coverage_count,
        }
    }

    pub fn selections(&self) -> &[SelectionRecord] {
        &self.report.selections
    }

    /// Whether the run met its coverage goals.
    ///
    /// Primary coverage must be complete, and so must the backstop when it
    /// is enabled.
    pub fn is_complete(&self) -> bool {
        (!self.backstop_enabled || !self.not_backstopped) && !self.not_covered
    }
}
