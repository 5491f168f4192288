//! Run budgets shared by both selection phases.

use std::time::Instant;

use super::Termination;
use crate::config::SelectionConfig;

/// Cumulative limits for one selection run.
///
/// The selection cap and the iteration cap count across the primary and
/// backstop phases. All limits are optional and unbounded by default.
#[derive(Debug, Clone)]
pub(crate) struct RunBudget {
    max_selections: Option<usize>,
    max_iterations: Option<usize>,
    deadline: Option<Instant>,
    iterations: usize,
}

impl RunBudget {
    pub(crate) fn new(config: &SelectionConfig) -> Self {
        Self {
            max_selections: config.max_selections,
            max_iterations: config.max_iterations,
            // A budget too large to represent is as good as none
            deadline: config
                .time_budget
                .and_then(|budget| Instant::now().checked_add(budget)),
            iterations: 0,
        }
    }

    /// Whether `selected` selections use up the cap.
    pub(crate) fn selections_exhausted(&self, selected: usize) -> bool {
        self.max_selections.is_some_and(|max| selected >= max)
    }

    /// The iteration or time limit that has been reached, if any.
    pub(crate) fn run_limit(&self) -> Option<Termination> {
        if self
            .max_iterations
            .is_some_and(|max| self.iterations >= max)
        {
            return Some(Termination::IterationBudget);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(Termination::TimeBudget);
        }
        None
    }

    /// Count one scoring pass.
    pub(crate) fn record_iteration(&mut self) {
        self.iterations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_unbounded_by_default() {
        let mut budget = RunBudget::new(&SelectionConfig::default());
        for _ in 0..1000 {
            budget.record_iteration();
        }
        assert!(!budget.selections_exhausted(usize::MAX - 1));
        assert_eq!(budget.run_limit(), None);
    }

    #[test]
    fn test_selection_cap() {
        let budget = RunBudget::new(&SelectionConfig::default().with_max_selections(2));
        assert!(!budget.selections_exhausted(1));
        assert!(budget.selections_exhausted(2));
    }

    #[test]
    fn test_zero_selection_cap_is_exhausted_immediately() {
        let budget = RunBudget::new(&SelectionConfig::default().with_max_selections(0));
        assert!(budget.selections_exhausted(0));
    }

    #[test]
    fn test_iteration_cap() {
        let mut budget = RunBudget::new(&SelectionConfig::default().with_max_iterations(2));
        budget.record_iteration();
        assert_eq!(budget.run_limit(), None);
        budget.record_iteration();
        assert_eq!(budget.run_limit(), Some(Termination::IterationBudget));
    }

    #[test]
    fn test_expired_time_budget() {
        let budget = RunBudget::new(&SelectionConfig::default().with_time_budget(Duration::ZERO));
        assert_eq!(budget.run_limit(), Some(Termination::TimeBudget));
    }

    #[test]
    fn test_huge_time_budget_is_unbounded() {
        let budget = RunBudget::new(&SelectionConfig::default().with_time_budget(Duration::MAX));
        assert_eq!(budget.run_limit(), None);
    }
}
