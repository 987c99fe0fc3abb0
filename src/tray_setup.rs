use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle, Manager,
};

use crate::{
    append_desktop_log, runtime_paths, shell_locale, tray_actions, tray_labels,
    tray_menu_handler, voice_tray, window_actions, AutoUpdateCheckState, TrayMenuState,
    DEFAULT_SHELL_LOCALE, MAIN_WINDOW_LABEL, TRAY_ID,
};

fn menu_item(
    app_handle: &AppHandle,
    id: &str,
    text: &str,
) -> Result<MenuItem<tauri::Wry>, String> {
    MenuItem::with_id(app_handle, id, text, true, None::<&str>)
        .map_err(|error| format!("Failed to create tray menu item {id}: {error}"))
}

pub fn setup_tray(app_handle: &AppHandle) -> Result<(), String> {
    let locale = shell_locale::resolve_shell_locale(
        DEFAULT_SHELL_LOCALE,
        runtime_paths::desktop_state_path().as_deref(),
    );
    let shell_texts = shell_locale::shell_texts_for_locale(locale);
    let main_window_visible = app_handle
        .get_webview_window(MAIN_WINDOW_LABEL)
        .and_then(|window| window.is_visible().ok())
        .unwrap_or(false);
    let auto_update_check_enabled = app_handle
        .try_state::<AutoUpdateCheckState>()
        .map(|state| state.is_enabled())
        .unwrap_or(true);

    let toggle_item = menu_item(
        app_handle,
        tray_actions::TRAY_MENU_TOGGLE_WINDOW,
        tray_labels::toggle_label(&shell_texts, main_window_visible),
    )?;
    let reload_item = menu_item(
        app_handle,
        tray_actions::TRAY_MENU_RELOAD_WINDOW,
        shell_texts.tray_reload,
    )?;
    let auto_update_check_item = menu_item(
        app_handle,
        tray_actions::TRAY_MENU_TOGGLE_AUTO_UPDATE_CHECK,
        tray_labels::auto_update_check_label(&shell_texts, auto_update_check_enabled),
    )?;
    let quit_item = menu_item(app_handle, tray_actions::TRAY_MENU_QUIT, shell_texts.tray_quit)?;
    let separator = PredefinedMenuItem::separator(app_handle)
        .map_err(|error| format!("Failed to create tray separator menu item: {error}"))?;

    let menu = Menu::with_items(
        app_handle,
        &[
            &toggle_item,
            &reload_item,
            &auto_update_check_item,
            &separator,
            &quit_item,
        ],
    )
    .map_err(|error| format!("Failed to build tray menu: {error}"))?;

    if !app_handle.manage(TrayMenuState {
        toggle_item: toggle_item.clone(),
        reload_item: reload_item.clone(),
        auto_update_check_item: auto_update_check_item.clone(),
        quit_item: quit_item.clone(),
    }) {
        append_desktop_log("tray menu state already exists, skipping manage");
    }

    let tray_builder = TrayIconBuilder::with_id(TRAY_ID)
        .menu(&menu)
        .tooltip(shell_texts.tray_voice_disconnected)
        .icon(voice_tray::icon_for_status(voice_tray::VoiceStatus::Disconnected))
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| {
            tray_menu_handler::handle_tray_menu_event(app, event.id().as_ref())
        })
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                tray_labels::update_tray_menu_labels(tray.app_handle(), append_desktop_log);
                if button == MouseButton::Left {
                    window_actions::toggle_main_window(tray.app_handle(), append_desktop_log);
                }
            }
        });

    #[cfg(target_os = "macos")]
    let tray_builder = tray_builder.icon_as_template(true);

    tray_builder
        .build(app_handle)
        .map_err(|error| format!("Failed to create tray icon: {error}"))?;

    tray_labels::update_tray_menu_labels(app_handle, append_desktop_log);
    Ok(())
}
