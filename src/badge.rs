use crate::models::MAX_OBJECTIVES;

#[cfg(all(feature = "app", not(test)))]
use tauri::{tray::TrayIconBuilder, App, AppHandle, Manager, Runtime};

#[cfg(all(feature = "app", not(test)))]
const BADGE_TRAY_ID: &str = "badge";

/// The count overlay text: the objective count, or empty (which hides the
/// badge) at zero.
pub fn badge_text(count: usize) -> String {
    if count == 0 {
        String::new()
    } else {
        count.to_string()
    }
}

pub fn badge_tooltip(count: usize) -> String {
    format!("Objectives: {count}/{MAX_OBJECTIVES}")
}

#[cfg(all(feature = "app", not(test)))]
pub fn init_badge(app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
    let icon = app.default_window_icon().cloned().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "default window icon is missing",
        )
    })?;

    let _tray = TrayIconBuilder::with_id(BADGE_TRAY_ID)
        .icon(icon)
        .tooltip(badge_tooltip(0))
        .build(app)?;

    Ok(())
}

/// Refreshes the badge after every persist.
#[cfg(all(feature = "app", not(test)))]
pub fn update_badge_count<R: Runtime>(app: &AppHandle<R>, count: usize) {
    let Some(tray) = app.tray_by_id(BADGE_TRAY_ID) else {
        log::warn!("badge: tray icon missing");
        return;
    };

    let text = badge_text(count);
    let title = if text.is_empty() { None } else { Some(text) };
    if let Err(err) = tray.set_title(title) {
        log::warn!("badge: failed to update title: {err}");
    }
    if let Err(err) = tray.set_tooltip(Some(badge_tooltip(count))) {
        log::warn!("badge: failed to update tooltip: {err}");
    }
}
