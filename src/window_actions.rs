use tauri::{AppHandle, Manager};

use crate::{main_window, tray_labels, MAIN_WINDOW_LABEL};

pub fn show_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    main_window::show_main_window(app_handle, &log);
    tray_labels::update_tray_menu_labels_with_visibility(app_handle, Some(true), log);
}

pub fn hide_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    main_window::hide_main_window(app_handle, &log);
    tray_labels::update_tray_menu_labels_with_visibility(app_handle, Some(false), log);
}

/// Hidden or minimized windows are brought forward; a visible one is sent to the tray.
pub fn toggle_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str) + Copy,
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("toggle_main_window skipped: main window not found");
        return;
    };

    let minimized = window.is_minimized().unwrap_or(false);
    match window.is_visible() {
        Ok(true) if !minimized => hide_main_window(app_handle, log),
        Ok(_) => show_main_window(app_handle, log),
        Err(error) => log(&format!(
            "failed to read main window visibility in toggle_main_window: {error}"
        )),
    }
}

pub fn reload_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    main_window::reload_main_window(app_handle, log);
}
