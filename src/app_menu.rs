//! Application menu bar. Only macOS shows one; the client draws its own chrome elsewhere.

use tauri::{
    menu::{AboutMetadata, Menu, MenuItem, PredefinedMenuItem, Submenu},
    AppHandle, Wry,
};

use crate::{append_desktop_log, window_actions, PRODUCT_NAME};

const APP_MENU_RELOAD: &str = "app_menu_reload";

pub(crate) fn build_app_menu(app_handle: &AppHandle) -> tauri::Result<Menu<Wry>> {
    let about = AboutMetadata {
        name: Some(PRODUCT_NAME.to_string()),
        version: Some(app_handle.package_info().version.to_string()),
        ..Default::default()
    };

    let app_submenu = Submenu::with_items(
        app_handle,
        PRODUCT_NAME,
        true,
        &[
            &PredefinedMenuItem::about(app_handle, None, Some(about))?,
            &PredefinedMenuItem::separator(app_handle)?,
            &PredefinedMenuItem::services(app_handle, None)?,
            &PredefinedMenuItem::separator(app_handle)?,
            &PredefinedMenuItem::hide(app_handle, None)?,
            &PredefinedMenuItem::hide_others(app_handle, None)?,
            &PredefinedMenuItem::show_all(app_handle, None)?,
            &PredefinedMenuItem::separator(app_handle)?,
            &PredefinedMenuItem::quit(app_handle, None)?,
        ],
    )?;

    let edit_submenu = Submenu::with_items(
        app_handle,
        "Edit",
        true,
        &[
            &PredefinedMenuItem::undo(app_handle, None)?,
            &PredefinedMenuItem::redo(app_handle, None)?,
            &PredefinedMenuItem::separator(app_handle)?,
            &PredefinedMenuItem::cut(app_handle, None)?,
            &PredefinedMenuItem::copy(app_handle, None)?,
            &PredefinedMenuItem::paste(app_handle, None)?,
            &PredefinedMenuItem::select_all(app_handle, None)?,
        ],
    )?;

    let reload_item = MenuItem::with_id(
        app_handle,
        APP_MENU_RELOAD,
        "Reload",
        true,
        Some("CmdOrCtrl+R"),
    )?;
    let view_submenu = Submenu::with_items(
        app_handle,
        "View",
        true,
        &[
            &reload_item,
            &PredefinedMenuItem::separator(app_handle)?,
            &PredefinedMenuItem::fullscreen(app_handle, None)?,
        ],
    )?;

    let window_submenu = Submenu::with_items(
        app_handle,
        "Window",
        true,
        &[
            &PredefinedMenuItem::minimize(app_handle, None)?,
            &PredefinedMenuItem::maximize(app_handle, None)?,
            &PredefinedMenuItem::separator(app_handle)?,
            &PredefinedMenuItem::close_window(app_handle, None)?,
        ],
    )?;

    Menu::with_items(
        app_handle,
        &[&app_submenu, &edit_submenu, &view_submenu, &window_submenu],
    )
}

pub(crate) fn handle_app_menu_event(app_handle: &AppHandle, menu_id: &str) {
    if menu_id == APP_MENU_RELOAD {
        window_actions::reload_main_window(app_handle, append_desktop_log);
    }
}
