use serde::{Deserialize, Serialize};

/// Epoch milliseconds. Timers and ids both use this resolution.
pub type Timestamp = i64;

/// Hard cap on the list; enforced on add, never on load.
pub const MAX_OBJECTIVES: usize = 8;

/// At most this many tags survive parsing; the rest of the input is dropped.
pub const MAX_TAGS: usize = 5;

/// The only countdown durations the UI offers.
pub const TIMER_PRESET_HOURS: [u32; 5] = [1, 2, 3, 5, 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Low
    }
}

impl Priority {
    /// One step in the fixed low -> medium -> high -> low cycle.
    pub fn next(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    /// The label shown on the clickable priority chip; also what search
    /// matches against.
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Objective {
    pub id: Timestamp,
    pub text: String,
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    pub completed: bool,
    /// RFC 3339 creation time. Informational only; no logic reads it.
    pub created_at: String,
    /// Absolute countdown deadline. Present iff a timer is active; the field
    /// is omitted from JSON entirely when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_end: Option<Timestamp>,
}

/// Splits comma-separated tag input: trimmed, blanks dropped, capped at
/// [`MAX_TAGS`]. Duplicates are kept on purpose.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .take(MAX_TAGS)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ObjectivesFile {
    pub objectives: Vec<Objective>,
}
