use std::sync::{Arc, Mutex};

use crate::models::{Objective, ObjectivesFile, Priority, Timestamp};

/// The single in-memory source of truth for the objective list. Persisted
/// storage is always a trailing mirror written after every mutation.
///
/// Only the UI command path mutates it; the alarm notifier reads persisted
/// storage independently and never touches this state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<Vec<Objective>>>,
}

impl AppState {
    pub fn new(objectives: Vec<Objective>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(objectives)),
        }
    }

    pub fn objectives(&self) -> Vec<Objective> {
        let guard = self.inner.lock().expect("state poisoned");
        (*guard).clone()
    }

    pub fn objectives_file(&self) -> ObjectivesFile {
        ObjectivesFile {
            objectives: self.objectives(),
        }
    }

    pub fn len(&self) -> usize {
        let guard = self.inner.lock().expect("state poisoned");
        guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids derive from the creation timestamp (epoch ms) but must stay
    /// unique, so a same-millisecond add bumps past the current maximum.
    pub fn next_id(&self, now_ms: Timestamp) -> Timestamp {
        let guard = self.inner.lock().expect("state poisoned");
        let max_id = guard.iter().map(|o| o.id).max().unwrap_or(0);
        now_ms.max(max_id + 1)
    }

    pub fn add_objective(&self, objective: Objective) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.push(objective);
    }

    pub fn replace_objectives(&self, objectives: Vec<Objective>) {
        let mut guard = self.inner.lock().expect("state poisoned");
        *guard = objectives;
    }

    /// Updates the text of the matching objective. Returns false when the id
    /// is unknown.
    pub fn set_text(&self, id: Timestamp, text: String) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        match guard.iter_mut().find(|o| o.id == id) {
            Some(objective) => {
                objective.text = text;
                true
            }
            None => false,
        }
    }

    pub fn cycle_priority(&self, id: Timestamp) -> Option<Priority> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let objective = guard.iter_mut().find(|o| o.id == id)?;
        objective.priority = objective.priority.next();
        Some(objective.priority)
    }

    /// Flips the completed flag and returns the updated objective.
    pub fn toggle_completed(&self, id: Timestamp) -> Option<Objective> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let objective = guard.iter_mut().find(|o| o.id == id)?;
        objective.completed = !objective.completed;
        Some(objective.clone())
    }

    /// Sets or clears the countdown deadline. Returns the previous value so
    /// callers can roll back a failed persist, or `None` when the id is
    /// unknown.
    pub fn set_timer_end(
        &self,
        id: Timestamp,
        timer_end: Option<Timestamp>,
    ) -> Option<Option<Timestamp>> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let objective = guard.iter_mut().find(|o| o.id == id)?;
        let previous = objective.timer_end;
        objective.timer_end = timer_end;
        Some(previous)
    }

    pub fn remove(&self, id: Timestamp) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let before = guard.len();
        guard.retain(|o| o.id != id);
        guard.len() != before
    }

    /// Rebuilds the list in the order given by `ids`. The ids must be an
    /// exact permutation of the current list (nothing lost, nothing
    /// duplicated); otherwise the list is left untouched and false is
    /// returned.
    pub fn reorder(&self, ids: &[Timestamp]) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        if ids.len() != guard.len() {
            return false;
        }
        let mut remaining: Vec<Objective> = (*guard).clone();
        let mut reordered = Vec::with_capacity(ids.len());
        for id in ids {
            match remaining.iter().position(|o| o.id == *id) {
                Some(index) => reordered.push(remaining.swap_remove(index)),
                None => return false,
            }
        }
        *guard = reordered;
        true
    }

    /// Empties the list and returns the ids that were present (the caller
    /// clears their alarms).
    pub fn clear_all(&self) -> Vec<Timestamp> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let ids = guard.iter().map(|o| o.id).collect();
        guard.clear();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn make_objective(id: Timestamp) -> Objective {
        Objective {
            id,
            text: format!("objective-{id}"),
            priority: Priority::Low,
            tags: Vec::new(),
            completed: false,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            timer_end: None,
        }
    }

    #[test]
    fn next_id_prefers_now_but_never_collides() {
        let state = AppState::new(Vec::new());
        assert_eq!(state.next_id(1000), 1000);

        state.add_objective(make_objective(1000));
        // Same millisecond: bump past the existing maximum.
        assert_eq!(state.next_id(1000), 1001);
        // Later millisecond wins outright.
        assert_eq!(state.next_id(5000), 5000);
    }

    #[test]
    fn set_text_and_cycle_priority_ignore_unknown_ids() {
        let state = AppState::new(vec![make_objective(1)]);

        assert!(state.set_text(1, "updated".to_string()));
        assert_eq!(state.objectives()[0].text, "updated");
        assert!(!state.set_text(99, "nope".to_string()));

        assert_eq!(state.cycle_priority(1), Some(Priority::Medium));
        assert_eq!(state.cycle_priority(1), Some(Priority::High));
        assert_eq!(state.cycle_priority(1), Some(Priority::Low));
        assert_eq!(state.cycle_priority(99), None);
    }

    #[test]
    fn toggle_completed_flips_both_ways() {
        let state = AppState::new(vec![make_objective(1)]);

        let toggled = state.toggle_completed(1).expect("objective exists");
        assert!(toggled.completed);
        let toggled = state.toggle_completed(1).expect("objective exists");
        assert!(!toggled.completed);
        assert!(state.toggle_completed(99).is_none());
    }

    #[test]
    fn set_timer_end_returns_previous_value_for_rollback() {
        let state = AppState::new(vec![make_objective(1)]);

        assert_eq!(state.set_timer_end(1, Some(500)), Some(None));
        assert_eq!(state.set_timer_end(1, Some(900)), Some(Some(500)));
        assert_eq!(state.set_timer_end(1, None), Some(Some(900)));
        assert_eq!(state.objectives()[0].timer_end, None);
        assert_eq!(state.set_timer_end(99, Some(1)), None);
    }

    #[test]
    fn remove_reports_whether_anything_was_deleted() {
        let state = AppState::new(vec![make_objective(1), make_objective(2)]);

        assert!(state.remove(1));
        assert!(!state.remove(1));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn reorder_applies_exact_permutations_only() {
        let state = AppState::new(vec![
            make_objective(1),
            make_objective(2),
            make_objective(3),
        ]);

        assert!(state.reorder(&[3, 1, 2]));
        let ids: Vec<_> = state.objectives().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        // Wrong length, unknown id, duplicated id: all rejected untouched.
        assert!(!state.reorder(&[3, 1]));
        assert!(!state.reorder(&[3, 1, 99]));
        assert!(!state.reorder(&[3, 3, 1]));
        let ids: Vec<_> = state.objectives().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn clear_all_returns_the_removed_ids() {
        let state = AppState::new(vec![make_objective(7), make_objective(8)]);
        assert_eq!(state.clear_all(), vec![7, 8]);
        assert!(state.is_empty());
        assert_eq!(state.clear_all(), Vec::<Timestamp>::new());
    }
}
