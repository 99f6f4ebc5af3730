use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::models::{Objective, Timestamp};

#[cfg(all(feature = "app", not(test)))]
use std::time::Duration;

#[cfg(all(feature = "app", not(test)))]
use chrono::Utc;
#[cfg(all(feature = "app", not(test)))]
use tauri::{AppHandle, Manager};
#[cfg(all(feature = "app", not(test)))]
use tauri_plugin_notification::NotificationExt;

#[cfg(all(feature = "app", not(test)))]
use crate::storage::Storage;

const ALARM_PREFIX: &str = "timer-";

pub const NOTIFICATION_TITLE: &str = "Time is up!";

/// Shown when the alarm outlives its objective (deleted after scheduling).
/// Expected, non-fatal.
pub const FALLBACK_NAME: &str = "A micro-objective";

pub fn alarm_name(id: Timestamp) -> String {
    format!("{ALARM_PREFIX}{id}")
}

pub fn notification_body(name: &str) -> String {
    format!("Time has expired for: {name}")
}

/// One fire-once alarm per active countdown, keyed by objective id. This is
/// the scheduled half of the timer pairing: an objective's `timer_end` and
/// its registry entry must be created and cleared together (the command layer
/// owns that pairing and its rollback).
#[derive(Clone, Default)]
pub struct AlarmRegistry {
    inner: Arc<Mutex<BTreeMap<Timestamp, Timestamp>>>,
}

impl AlarmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules (or reschedules) the alarm for `id` at the absolute
    /// deadline in epoch ms.
    pub fn schedule(&self, id: Timestamp, fire_at: Timestamp) {
        let mut guard = self.inner.lock().expect("alarm registry poisoned");
        guard.insert(id, fire_at);
    }

    /// Clears the alarm for `id`. Idempotent: clearing an absent alarm just
    /// returns false.
    pub fn clear(&self, id: Timestamp) -> bool {
        let mut guard = self.inner.lock().expect("alarm registry poisoned");
        guard.remove(&id).is_some()
    }

    pub fn contains(&self, id: Timestamp) -> bool {
        let guard = self.inner.lock().expect("alarm registry poisoned");
        guard.contains_key(&id)
    }

    pub fn fire_at(&self, id: Timestamp) -> Option<Timestamp> {
        let guard = self.inner.lock().expect("alarm registry poisoned");
        guard.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        let guard = self.inner.lock().expect("alarm registry poisoned");
        guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns every alarm due at `now_ms`. Removal before
    /// delivery keeps firing at-most-once per process.
    pub fn take_due(&self, now_ms: Timestamp) -> Vec<Timestamp> {
        let mut guard = self.inner.lock().expect("alarm registry poisoned");
        let due: Vec<Timestamp> = guard
            .iter()
            .filter(|(_, fire_at)| **fire_at <= now_ms)
            .map(|(id, _)| *id)
            .collect();
        for id in &due {
            guard.remove(id);
        }
        due
    }
}

/// Startup repair for the two-step timer pairing: any stored `timer_end`
/// whose alarm is missing (e.g. the process died between the two writes, or
/// simply restarted) gets the alarm re-created at its original deadline.
/// Past deadlines become immediately due, so a notification missed while the
/// app was closed still goes out once. Returns how many alarms were
/// restored.
pub fn reconcile_startup(registry: &AlarmRegistry, objectives: &[Objective]) -> usize {
    let mut restored = 0;
    for objective in objectives {
        if let Some(timer_end) = objective.timer_end {
            if !registry.contains(objective.id) {
                registry.schedule(objective.id, timer_end);
                restored += 1;
            }
        }
    }
    restored
}

/// Resolves the name to show in the expiry notification.
pub fn display_name_for(objectives: &[Objective], id: Timestamp) -> String {
    objectives
        .iter()
        .find(|o| o.id == id)
        .map(|o| o.text.clone())
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// The background notifier. Independent of the popup window's lifetime; it
/// reads the persisted list rather than live state so a fired alarm resolves
/// against whatever was last saved.
#[cfg(all(feature = "app", not(test)))]
pub fn start_notifier(app: AppHandle, registry: AlarmRegistry) {
    tauri::async_runtime::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let now_ms = Utc::now().timestamp_millis();
            let due = registry.take_due(now_ms);
            if due.is_empty() {
                continue;
            }

            let objectives = match app.path().app_data_dir() {
                Ok(root) => Storage::new(root)
                    .load_objectives()
                    .map(|file| file.objectives)
                    .unwrap_or_default(),
                Err(err) => {
                    log::warn!("notifier: app data dir unavailable: {err}");
                    Vec::new()
                }
            };

            for id in due {
                let name = display_name_for(&objectives, id);
                log::info!("notifier: alarm fired name={} task={name}", alarm_name(id));
                if let Err(err) = app
                    .notification()
                    .builder()
                    .title(NOTIFICATION_TITLE)
                    .body(notification_body(&name))
                    .show()
                {
                    log::warn!("notifier: failed to show notification: {err}");
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn make_objective(id: Timestamp, timer_end: Option<Timestamp>) -> Objective {
        Objective {
            id,
            text: format!("objective-{id}"),
            priority: Priority::Low,
            tags: Vec::new(),
            completed: false,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            timer_end,
        }
    }

    #[test]
    fn alarm_names_carry_the_timer_prefix() {
        assert_eq!(alarm_name(1700000000000), "timer-1700000000000");
    }

    #[test]
    fn schedule_and_clear_are_idempotent_per_id() {
        let registry = AlarmRegistry::new();
        registry.schedule(1, 500);
        registry.schedule(1, 900);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.fire_at(1), Some(900));

        assert!(registry.clear(1));
        assert!(!registry.clear(1));
        assert!(registry.is_empty());
    }

    #[test]
    fn take_due_removes_only_elapsed_alarms() {
        let registry = AlarmRegistry::new();
        registry.schedule(1, 100);
        registry.schedule(2, 200);
        registry.schedule(3, 300);

        let due = registry.take_due(200);
        assert_eq!(due, vec![1, 2]);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(3));

        // A second sweep at the same instant delivers nothing again.
        assert!(registry.take_due(200).is_empty());
    }

    #[test]
    fn reconcile_restores_alarms_for_stored_deadlines() {
        let registry = AlarmRegistry::new();
        registry.schedule(1, 500);

        let objectives = vec![
            make_objective(1, Some(500)),  // already scheduled
            make_objective(2, Some(900)),  // missing alarm, future
            make_objective(3, Some(10)),   // missing alarm, already past
            make_objective(4, None),       // no timer at all
        ];

        let restored = reconcile_startup(&registry, &objectives);
        assert_eq!(restored, 2);
        assert_eq!(registry.fire_at(2), Some(900));
        // Past deadlines are scheduled as-is and therefore immediately due.
        assert_eq!(registry.take_due(100), vec![3]);
        assert!(!registry.contains(4));
    }

    #[test]
    fn display_name_falls_back_when_the_objective_is_gone() {
        let objectives = vec![make_objective(1, None)];
        assert_eq!(display_name_for(&objectives, 1), "objective-1");
        assert_eq!(display_name_for(&objectives, 99), FALLBACK_NAME);
    }

    #[test]
    fn notification_body_names_the_task() {
        assert_eq!(
            notification_body("Write report"),
            "Time has expired for: Write report"
        );
    }
}
