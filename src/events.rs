use crate::models::Objective;

pub const EVENT_STATE_UPDATED: &str = "state_updated";
pub const EVENT_COUNTDOWN_TICK: &str = "countdown_tick";

#[derive(Debug, Clone, serde::Serialize)]
pub struct StatePayload {
    pub objectives: Vec<Objective>,
}

/// Per-objective remaining-time readout pushed once a second. Purely
/// cosmetic: an expired display never cancels the timer itself.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TimerDisplay {
    pub id: i64,
    pub remaining: String,
    pub expired: bool,
}
