// Learn more about Tauri commands at https://tauri.app/develop/calling-rust/
mod alarms;
mod badge;
mod commands;
mod countdown;
mod events;
mod filter;
mod logging;
mod models;
mod state;
mod storage;

#[cfg(all(feature = "app", not(test)))]
use tauri::Manager;

#[cfg(all(feature = "app", not(test)))]
use crate::alarms::AlarmRegistry;
#[cfg(all(feature = "app", not(test)))]
use crate::commands::{load_state, run_command};
#[cfg(all(feature = "app", not(test)))]
use crate::state::AppState;
#[cfg(all(feature = "app", not(test)))]
use crate::storage::Storage;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
#[cfg(all(feature = "app", not(test)))]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_notification::init())
        .setup(|app| {
            let data_dir = app.path().app_data_dir()?;
            if let Err(err) = logging::init_logging(&data_dir) {
                eprintln!("failed to initialize logging: {err}");
            }

            let storage = Storage::new(data_dir);
            storage.ensure_dirs()?;
            let objectives = storage
                .load_objectives()
                .map(|file| file.objectives)
                .unwrap_or_default();

            let state = AppState::new(objectives);
            let registry = AlarmRegistry::new();
            // Stored deadlines must have a live alarm again after a restart.
            let restored = alarms::reconcile_startup(&registry, &state.objectives());
            if restored > 0 {
                log::info!("restored {restored} alarm(s) from stored deadlines");
            }

            app.manage(state.clone());
            app.manage(registry.clone());

            badge::init_badge(app)?;
            badge::update_badge_count(app.handle(), state.len());

            alarms::start_notifier(app.handle().clone(), registry);
            countdown::start_countdown_ticker(app.handle().clone(), state);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![load_state, run_command])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
