use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::{ChangeHook, DataChange};

/// Monthly targets. A target of 0 means "not tracked" and is omitted
/// from progress evaluation. `conversion_rate` is a fraction in [0,1].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub month: String,
    pub monthly_sales: u64,
    pub hourly_wage: u64,
    pub sessions: u32,
    pub conversion_rate: f64,
}

/// Goals keyed by month: at most one goal per `YYYY-MM` key at any
/// time, enforced by the map itself.
#[derive(Default)]
pub struct GoalStore {
    goals: BTreeMap<String, Goal>,
    hooks: Vec<ChangeHook>,
}

impl GoalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_change(&mut self, hook: impl FnMut(DataChange) + Send + 'static) {
        self.hooks.push(Box::new(hook));
    }

    /// Replaces any existing goal for the same month.
    pub fn upsert(&mut self, goal: Goal) {
        self.goals.insert(goal.month.clone(), goal);
        self.notify();
    }

    /// Removes the goal for the month if present. Idempotent.
    pub fn delete_by_month(&mut self, month: &str) -> Option<Goal> {
        let removed = self.goals.remove(month);
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    pub fn find_by_month(&self, month: &str) -> Option<&Goal> {
        self.goals.get(month)
    }

    pub fn all(&self) -> Vec<&Goal> {
        self.goals.values().collect()
    }

    /// Owned copy for persistence and export.
    pub fn snapshot(&self) -> Vec<Goal> {
        self.goals.values().cloned().collect()
    }

    /// Bulk import: full replacement. Duplicate months in the payload
    /// collapse to the last occurrence.
    pub fn replace_all(&mut self, goals: Vec<Goal>) {
        self.goals = goals
            .into_iter()
            .map(|goal| (goal.month.clone(), goal))
            .collect();
        self.notify();
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    fn notify(&mut self) {
        for hook in &mut self.hooks {
            hook(DataChange::Goals);
        }
    }
}

impl fmt::Debug for GoalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoalStore")
            .field("goals", &self.goals)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(month: &str, monthly_sales: u64) -> Goal {
        Goal {
            month: month.into(),
            monthly_sales,
            ..Goal::default()
        }
    }

    #[test]
    fn upsert_keeps_one_goal_per_month() {
        let mut store = GoalStore::new();
        store.upsert(goal("2024-03", 100_000));
        store.upsert(goal("2024-04", 150_000));
        store.upsert(goal("2024-03", 200_000));

        assert_eq!(store.len(), 2);
        let march = store.find_by_month("2024-03").expect("goal must exist");
        assert_eq!(march.monthly_sales, 200_000);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = GoalStore::new();
        store.upsert(goal("2024-03", 100_000));

        assert!(store.delete_by_month("2024-03").is_some());
        assert!(store.delete_by_month("2024-03").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn replace_all_collapses_duplicate_months() {
        let mut store = GoalStore::new();
        store.upsert(goal("2023-12", 1));

        store.replace_all(vec![goal("2024-03", 10), goal("2024-03", 20)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_month("2024-03").unwrap().monthly_sales, 20);
        assert!(store.find_by_month("2023-12").is_none());
    }
}
