use tauri::{menu::MenuItem, AppHandle, Manager};

use crate::{
    runtime_paths, shell_locale, tray_actions, AutoUpdateCheckState, TrayMenuState,
    DEFAULT_SHELL_LOCALE, MAIN_WINDOW_LABEL,
};

fn set_menu_text_safe<F>(item: &MenuItem<tauri::Wry>, text: &str, item_name: &str, log: F)
where
    F: Fn(&str),
{
    if let Err(error) = item.set_text(text) {
        log(&format!(
            "failed to update tray menu text for {}: {}",
            item_name, error
        ));
    }
}

pub(crate) fn toggle_label(texts: &shell_locale::ShellTexts, window_visible: bool) -> &'static str {
    if window_visible {
        texts.tray_hide
    } else {
        texts.tray_show
    }
}

pub(crate) fn auto_update_check_label(
    texts: &shell_locale::ShellTexts,
    enabled: bool,
) -> &'static str {
    if enabled {
        texts.tray_auto_update_check_on
    } else {
        texts.tray_auto_update_check_off
    }
}

pub fn update_tray_menu_labels<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    update_tray_menu_labels_with_visibility(app_handle, None, log);
}

pub fn update_tray_menu_labels_with_visibility<F>(
    app_handle: &AppHandle,
    visible_override: Option<bool>,
    log: F,
) where
    F: Fn(&str),
{
    let Some(tray_state) = app_handle.try_state::<TrayMenuState>() else {
        return;
    };

    let locale = shell_locale::resolve_shell_locale(
        DEFAULT_SHELL_LOCALE,
        runtime_paths::desktop_state_path().as_deref(),
    );
    let shell_texts = shell_locale::shell_texts_for_locale(locale);
    let effective_visible = visible_override.unwrap_or_else(|| {
        app_handle
            .get_webview_window(MAIN_WINDOW_LABEL)
            .and_then(|window| window.is_visible().ok())
            .unwrap_or(false)
    });
    let auto_update_check_enabled = app_handle
        .try_state::<AutoUpdateCheckState>()
        .map(|state| state.is_enabled())
        .unwrap_or(true);

    set_menu_text_safe(
        &tray_state.toggle_item,
        toggle_label(&shell_texts, effective_visible),
        tray_actions::TRAY_MENU_TOGGLE_WINDOW,
        &log,
    );
    set_menu_text_safe(
        &tray_state.reload_item,
        shell_texts.tray_reload,
        tray_actions::TRAY_MENU_RELOAD_WINDOW,
        &log,
    );
    set_menu_text_safe(
        &tray_state.auto_update_check_item,
        auto_update_check_label(&shell_texts, auto_update_check_enabled),
        tray_actions::TRAY_MENU_TOGGLE_AUTO_UPDATE_CHECK,
        &log,
    );
    set_menu_text_safe(
        &tray_state.quit_item,
        shell_texts.tray_quit,
        tray_actions::TRAY_MENU_QUIT,
        &log,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_label_follows_window_visibility() {
        let texts = shell_locale::shell_texts_for_locale("en-US");
        assert_eq!(toggle_label(&texts, true), "Hide Parley");
        assert_eq!(toggle_label(&texts, false), "Show Parley");
    }

    #[test]
    fn auto_update_check_label_follows_toggle() {
        let texts = shell_locale::shell_texts_for_locale("zh-CN");
        assert_eq!(auto_update_check_label(&texts, true), "启动时检查更新：开");
        assert_eq!(auto_update_check_label(&texts, false), "启动时检查更新：关");
    }
}
