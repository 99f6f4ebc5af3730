use crate::events::TimerDisplay;
use crate::models::{Objective, Timestamp};

#[cfg(all(feature = "app", not(test)))]
use std::time::Duration;

#[cfg(all(feature = "app", not(test)))]
use chrono::Utc;
#[cfg(all(feature = "app", not(test)))]
use tauri::{AppHandle, Emitter};

#[cfg(all(feature = "app", not(test)))]
use crate::events::EVENT_COUNTDOWN_TICK;
#[cfg(all(feature = "app", not(test)))]
use crate::state::AppState;

const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_SECOND: i64 = 1_000;

/// Formats the time left until `timer_end` as `Xh Ym Zs`. Once the deadline
/// passes the display freezes at `0h 0m 0s` and is flagged expired; clearing
/// the stored deadline is the cancel/complete/delete paths' job, not ours.
pub fn remaining_display(id: Timestamp, timer_end: Timestamp, now_ms: Timestamp) -> TimerDisplay {
    let remaining = timer_end - now_ms;
    if remaining <= 0 {
        return TimerDisplay {
            id,
            remaining: "0h 0m 0s".to_string(),
            expired: true,
        };
    }
    let hours = remaining / MS_PER_HOUR;
    let minutes = (remaining % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (remaining % MS_PER_MINUTE) / MS_PER_SECOND;
    TimerDisplay {
        id,
        remaining: format!("{hours}h {minutes}m {seconds}s"),
        expired: false,
    }
}

/// One display per objective that has a deadline, in list order.
pub fn collect_displays(objectives: &[Objective], now_ms: Timestamp) -> Vec<TimerDisplay> {
    objectives
        .iter()
        .filter_map(|objective| {
            objective
                .timer_end
                .map(|end| remaining_display(objective.id, end, now_ms))
        })
        .collect()
}

/// The 1-second UI tick. Emits a countdown payload whenever at least one
/// objective has an active or expired deadline.
#[cfg(all(feature = "app", not(test)))]
pub fn start_countdown_ticker(app: AppHandle, state: AppState) {
    tauri::async_runtime::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let now_ms = Utc::now().timestamp_millis();
            let displays = collect_displays(&state.objectives(), now_ms);
            if !displays.is_empty() {
                let _ = app.emit(EVENT_COUNTDOWN_TICK, displays);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn make_objective(id: i64, timer_end: Option<i64>) -> Objective {
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
    fn remaining_display_breaks_down_hours_minutes_seconds() {
        // 2h 30m 5s ahead of now.
        let now = 1_000_000;
        let end = now + 2 * MS_PER_HOUR + 30 * MS_PER_MINUTE + 5 * MS_PER_SECOND;
        let display = remaining_display(1, end, now);
        assert_eq!(display.remaining, "2h 30m 5s");
        assert!(!display.expired);
    }

    #[test]
    fn remaining_display_freezes_at_zero_once_expired() {
        let display = remaining_display(1, 1_000, 1_000);
        assert_eq!(display.remaining, "0h 0m 0s");
        assert!(display.expired);

        let display = remaining_display(1, 1_000, 999_999);
        assert_eq!(display.remaining, "0h 0m 0s");
        assert!(display.expired);
    }

    #[test]
    fn sub_second_remainders_round_down() {
        let display = remaining_display(1, 1_999, 1_000);
        assert_eq!(display.remaining, "0h 0m 0s");
        assert!(!display.expired);
    }

    #[test]
    fn collect_displays_skips_objectives_without_deadlines() {
        let objectives = vec![
            make_objective(1, None),
            make_objective(2, Some(10_000)),
            make_objective(3, Some(1)),
        ];

        let displays = collect_displays(&objectives, 5_000);
        assert_eq!(displays.len(), 2);
        assert_eq!(displays[0].id, 2);
        assert!(!displays[0].expired);
        assert_eq!(displays[1].id, 3);
        assert!(displays[1].expired);
    }
}
