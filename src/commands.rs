use chrono::Utc;
use std::path::PathBuf;

use crate::alarms::AlarmRegistry;
use crate::events::StatePayload;
use crate::filter::filter_objectives;
use crate::models::{
    parse_tags, Objective, Priority, Timestamp, MAX_OBJECTIVES, TIMER_PRESET_HOURS,
};
use crate::state::AppState;
use crate::storage::{Storage, StorageError};

#[cfg(all(feature = "app", not(test)))]
use crate::badge;
#[cfg(all(feature = "app", not(test)))]
use crate::events::EVENT_STATE_UPDATED;
#[cfg(all(feature = "app", not(test)))]
use tauri::{AppHandle, Emitter, Manager, Runtime, State};

const MS_PER_HOUR: i64 = 3_600_000;

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Every list interaction, as one typed command dispatched through a single
/// handler. The frontend never mutates state directly; it sends one of these.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Add {
        text: String,
        priority: Priority,
        tags: String,
    },
    EditText {
        id: Timestamp,
        text: String,
    },
    CyclePriority {
        id: Timestamp,
    },
    ToggleComplete {
        id: Timestamp,
    },
    Delete {
        id: Timestamp,
    },
    StartTimer {
        id: Timestamp,
        hours: u32,
    },
    CancelTimer {
        id: Timestamp,
    },
    Reorder {
        ids: Vec<Timestamp>,
    },
    Search {
        query: String,
    },
    ResetAll,
}

/// Platform touchpoints behind a trait so command logic is testable without
/// a running Tauri app.
trait CommandCtx {
    fn app_data_dir(&self) -> Result<PathBuf, StorageError>;
    fn emit_state_updated(&self, payload: StatePayload);
    fn update_badge(&self, count: usize);
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

/// Writes the full list to storage and refreshes the badge. Every mutation
/// funnels through here; there is no partial persistence.
fn save(ctx: &impl CommandCtx, state: &AppState) -> Result<(), StorageError> {
    let storage = Storage::new(ctx.app_data_dir()?);
    storage.ensure_dirs()?;
    storage.save_objectives(&state.objectives_file())?;
    ctx.update_badge(state.len());
    Ok(())
}

fn persist(ctx: &impl CommandCtx, state: &AppState) -> Result<(), StorageError> {
    save(ctx, state)?;
    ctx.emit_state_updated(StatePayload {
        objectives: state.objectives(),
    });
    Ok(())
}

/// Persist without a re-render event. Used by text edits and drag reorders,
/// where the DOM already shows the new state before the write lands.
fn persist_silent(ctx: &impl CommandCtx, state: &AppState) -> Result<(), StorageError> {
    save(ctx, state)
}

fn dispatch(
    ctx: &impl CommandCtx,
    state: &AppState,
    alarms: &AlarmRegistry,
    command: Command,
) -> CommandResult<Vec<Objective>> {
    match command {
        Command::Add {
            text,
            priority,
            tags,
        } => add_impl(ctx, state, text, priority, &tags),
        Command::EditText { id, text } => edit_text_impl(ctx, state, id, text),
        Command::CyclePriority { id } => cycle_priority_impl(ctx, state, id),
        Command::ToggleComplete { id } => toggle_complete_impl(ctx, state, alarms, id),
        Command::Delete { id } => delete_impl(ctx, state, alarms, id),
        Command::StartTimer { id, hours } => start_timer_impl(ctx, state, alarms, id, hours),
        Command::CancelTimer { id } => cancel_timer_impl(ctx, state, alarms, id),
        Command::Reorder { ids } => reorder_impl(ctx, state, &ids),
        Command::Search { query } => search_impl(state, &query),
        Command::ResetAll => reset_all_impl(ctx, state, alarms),
    }
}

fn add_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    text: String,
    priority: Priority,
    tags: &str,
) -> CommandResult<Vec<Objective>> {
    // Capacity is checked before the text is even looked at, so a full list
    // always answers with the limit warning.
    if state.len() >= MAX_OBJECTIVES {
        return err(&format!(
            "Focus! You've reached the {MAX_OBJECTIVES}-objective limit."
        ));
    }
    let text = text.trim().to_string();
    if text.is_empty() {
        // Empty input is ignored without an error banner.
        return ok(state.objectives());
    }

    let now = Utc::now();
    let objective = Objective {
        id: state.next_id(now.timestamp_millis()),
        text,
        priority,
        tags: parse_tags(tags),
        completed: false,
        created_at: now.to_rfc3339(),
        timer_end: None,
    };
    state.add_objective(objective);
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(state.objectives())
}

fn edit_text_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    id: Timestamp,
    text: String,
) -> CommandResult<Vec<Objective>> {
    let text = text.trim().to_string();
    // Blanking the text out, or editing a row that vanished, is a no-op.
    if text.is_empty() || !state.set_text(id, text) {
        return ok(state.objectives());
    }
    if let Err(error) = persist_silent(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(state.objectives())
}

fn cycle_priority_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    id: Timestamp,
) -> CommandResult<Vec<Objective>> {
    if state.cycle_priority(id).is_none() {
        return ok(state.objectives());
    }
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(state.objectives())
}

fn toggle_complete_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    alarms: &AlarmRegistry,
    id: Timestamp,
) -> CommandResult<Vec<Objective>> {
    let toggled = match state.toggle_completed(id) {
        Some(objective) => objective,
        None => return ok(state.objectives()),
    };
    if toggled.completed {
        // Completing a task also retires its countdown, both sides at once.
        alarms.clear(id);
        state.set_timer_end(id, None);
    }
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(state.objectives())
}

fn delete_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    alarms: &AlarmRegistry,
    id: Timestamp,
) -> CommandResult<Vec<Objective>> {
    alarms.clear(id);
    state.remove(id);
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(state.objectives())
}

fn start_timer_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    alarms: &AlarmRegistry,
    id: Timestamp,
    hours: u32,
) -> CommandResult<Vec<Objective>> {
    if !TIMER_PRESET_HOURS.contains(&hours) {
        return err(&format!("unsupported timer duration: {hours}h"));
    }
    let timer_end = Utc::now().timestamp_millis() + i64::from(hours) * MS_PER_HOUR;

    // The stored deadline and the scheduled alarm must agree: set both, and
    // restore both if the write does not land.
    let previous = match state.set_timer_end(id, Some(timer_end)) {
        Some(previous) => previous,
        None => return ok(state.objectives()),
    };
    alarms.schedule(id, timer_end);

    if let Err(error) = persist(ctx, state) {
        state.set_timer_end(id, previous);
        match previous {
            Some(previous_end) => alarms.schedule(id, previous_end),
            None => {
                alarms.clear(id);
            }
        }
        return err(&format!("storage error: {error:?}"));
    }
    ok(state.objectives())
}

fn cancel_timer_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    alarms: &AlarmRegistry,
    id: Timestamp,
) -> CommandResult<Vec<Objective>> {
    let previous = match state.set_timer_end(id, None) {
        Some(previous) => previous,
        None => return ok(state.objectives()),
    };
    alarms.clear(id);

    if let Err(error) = persist(ctx, state) {
        state.set_timer_end(id, previous);
        if let Some(previous_end) = previous {
            alarms.schedule(id, previous_end);
        }
        return err(&format!("storage error: {error:?}"));
    }
    ok(state.objectives())
}

fn reorder_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    ids: &[Timestamp],
) -> CommandResult<Vec<Objective>> {
    if !state.reorder(ids) {
        return err("reorder does not match the current objectives");
    }
    if let Err(error) = persist_silent(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(state.objectives())
}

/// View-only: filters the rendered list without ever touching stored state.
fn search_impl(state: &AppState, query: &str) -> CommandResult<Vec<Objective>> {
    let objectives = state.objectives();
    ok(filter_objectives(&objectives, query)
        .into_iter()
        .cloned()
        .collect())
}

/// The frontend confirms with the user before sending this; a declined
/// confirmation never reaches the backend.
fn reset_all_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    alarms: &AlarmRegistry,
) -> CommandResult<Vec<Objective>> {
    for id in state.clear_all() {
        alarms.clear(id);
    }
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(state.objectives())
}

/// Reloads the persisted list into memory and returns it; the popup-open
/// path. Missing or unreadable storage falls back to an empty list.
fn load_state_impl(ctx: &impl CommandCtx, state: &AppState) -> CommandResult<Vec<Objective>> {
    let root = match ctx.app_data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("app data dir error: {e}")),
    };
    let storage = Storage::new(root);
    if let Err(error) = storage.ensure_dirs() {
        return err(&format!("storage error: {error:?}"));
    }
    let objectives = storage
        .load_objectives()
        .map(|file| file.objectives)
        .unwrap_or_default();
    state.replace_objectives(objectives.clone());
    ctx.update_badge(state.len());
    ok(objectives)
}

#[cfg(all(feature = "app", not(test)))]
struct TauriCommandCtx<'a, R: Runtime> {
    app: &'a AppHandle<R>,
}

#[cfg(all(feature = "app", not(test)))]
impl<R: Runtime> CommandCtx for TauriCommandCtx<'_, R> {
    fn app_data_dir(&self) -> Result<PathBuf, StorageError> {
        self.app
            .path()
            .app_data_dir()
            .map_err(|err| StorageError::Io(std::io::Error::other(err.to_string())))
    }

    fn emit_state_updated(&self, payload: StatePayload) {
        let _ = self.app.emit(EVENT_STATE_UPDATED, payload);
    }

    fn update_badge(&self, count: usize) {
        badge::update_badge_count(self.app, count);
    }
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn load_state(app: AppHandle, state: State<AppState>) -> CommandResult<Vec<Objective>> {
    let ctx = TauriCommandCtx { app: &app };
    load_state_impl(&ctx, state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn run_command(
    app: AppHandle,
    state: State<AppState>,
    alarms: State<AlarmRegistry>,
    command: Command,
) -> CommandResult<Vec<Objective>> {
    let ctx = TauriCommandCtx { app: &app };
    dispatch(&ctx, state.inner(), alarms.inner(), command)
}
