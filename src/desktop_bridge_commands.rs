use tauri::{AppHandle, Manager};
use tauri_plugin_updater::UpdaterExt;

use crate::{
    append_desktop_log, append_shutdown_log, external_links, keybinds, main_window,
    media_permission, navigation_policy::NavigationDecision, notifications, rich_presence,
    runtime_paths, shell_locale, splash_window, tray_labels, update_check, voice_tray,
    AtomicFlagGuard, BridgeResult, DesktopAppUpdateCheckResult, HostPlatformFlags, ShellState,
};

#[tauri::command]
pub(crate) fn desktop_bridge_is_desktop_runtime() -> bool {
    true
}

#[tauri::command]
pub(crate) fn desktop_bridge_host_platform() -> HostPlatformFlags {
    HostPlatformFlags::current()
}

#[tauri::command]
pub(crate) async fn desktop_bridge_request_microphone_permission() -> bool {
    tauri::async_runtime::spawn_blocking(media_permission::request_microphone_permission)
        .await
        .unwrap_or(false)
}

#[tauri::command]
pub(crate) fn desktop_bridge_window_minimize(app_handle: AppHandle) -> BridgeResult {
    main_window::minimize_main_window(&app_handle).into()
}

#[tauri::command]
pub(crate) fn desktop_bridge_window_maximize(app_handle: AppHandle) -> BridgeResult {
    main_window::toggle_maximize_main_window(&app_handle)
        .map(|_| ())
        .into()
}

#[tauri::command]
pub(crate) fn desktop_bridge_window_quit(app_handle: AppHandle) {
    app_handle.state::<ShellState>().mark_quitting();
    append_shutdown_log("client requested quit");
    app_handle.exit(0);
}

#[tauri::command]
pub(crate) fn desktop_bridge_window_loaded(app_handle: AppHandle) {
    let state = app_handle.state::<ShellState>();
    if state.startup.mark_ready() {
        append_desktop_log("client reported loaded; startup signal is ready");
    }
    main_window::apply_loaded_window_state(&app_handle, append_desktop_log);
}

/// Entry point for `window.open` and `target=_blank` links coming from the client.
#[tauri::command]
pub(crate) fn desktop_bridge_open_url(app_handle: AppHandle, url: String) -> BridgeResult {
    let state = app_handle.state::<ShellState>();
    match state.navigation.decide_raw(&url) {
        Some(NavigationDecision::InApp) => match url::Url::parse(url.trim()) {
            Ok(parsed) => main_window::navigate_main_window(&app_handle, parsed).into(),
            Err(error) => BridgeResult::failed(format!("Invalid URL: {error}")),
        },
        Some(NavigationDecision::OpenExternal) => external_links::open_external(&url).into(),
        None => BridgeResult::failed("Invalid URL."),
    }
}

#[tauri::command]
pub(crate) fn desktop_bridge_open_external_url(url: String) -> BridgeResult {
    external_links::open_external(&url).into()
}

#[tauri::command]
pub(crate) fn desktop_bridge_set_shell_locale(
    app_handle: AppHandle,
    locale: Option<String>,
) -> BridgeResult {
    let state_path = runtime_paths::desktop_state_path();
    match shell_locale::write_cached_shell_locale(locale.as_deref(), state_path.as_deref()) {
        Ok(()) => {
            tray_labels::update_tray_menu_labels(&app_handle, append_desktop_log);
            if let Err(error) = splash_window::push_splash_texts(&app_handle) {
                append_desktop_log(&error);
            }
            if let Err(error) = voice_tray::refresh_voice_tray(&app_handle) {
                append_desktop_log(&error);
            }
            BridgeResult::ok()
        }
        Err(error) => {
            append_desktop_log(&format!("failed to persist shell locale: {error}"));
            BridgeResult::failed(error)
        }
    }
}

#[tauri::command]
pub(crate) fn desktop_bridge_notify(
    app_handle: AppHandle,
    request: notifications::NotificationRequest,
) -> Result<notifications::NotificationOutcome, String> {
    notifications::notify(&app_handle, request)
}

#[tauri::command]
pub(crate) fn desktop_bridge_set_voice_state(
    app_handle: AppHandle,
    status: voice_tray::VoiceStatus,
) -> BridgeResult {
    voice_tray::set_voice_status(&app_handle, status).into()
}

async fn update_presence(
    app_handle: AppHandle,
    update: Option<rich_presence::PresenceUpdate>,
) -> BridgeResult {
    let result = tauri::async_runtime::spawn_blocking(move || {
        app_handle
            .state::<rich_presence::PresenceState>()
            .update(update.as_ref())
    })
    .await;

    match result {
        Ok(Ok(())) => BridgeResult::ok(),
        Ok(Err(error)) => {
            tracing::debug!("rich presence update failed: {error}");
            BridgeResult::failed(error.to_string())
        }
        Err(error) => BridgeResult::failed(format!("Rich presence task failed: {error}")),
    }
}

#[tauri::command]
pub(crate) async fn desktop_bridge_set_presence(
    app_handle: AppHandle,
    activity: rich_presence::PresenceUpdate,
) -> BridgeResult {
    update_presence(app_handle, Some(activity)).await
}

#[tauri::command]
pub(crate) async fn desktop_bridge_clear_presence(app_handle: AppHandle) -> BridgeResult {
    update_presence(app_handle, None).await
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_keybinds(app_handle: AppHandle) -> keybinds::KeybindTable {
    app_handle.state::<keybinds::KeybindState>().bindings()
}

#[tauri::command]
pub(crate) fn desktop_bridge_set_keybind(
    app_handle: AppHandle,
    action: keybinds::KeybindAction,
    accelerator: String,
) -> Result<keybinds::KeybindTable, String> {
    keybinds::set_keybind(&app_handle, action, &accelerator).inspect_err(|error| {
        append_desktop_log(&format!("failed to update keybind '{}': {error}", action.id()))
    })
}

#[tauri::command]
pub(crate) async fn desktop_bridge_check_desktop_app_update(
    app_handle: AppHandle,
) -> DesktopAppUpdateCheckResult {
    let current_version = app_handle.package_info().version.to_string();
    let state = app_handle.state::<ShellState>();
    if !state.config.updater_allowed || !state.is_updater_ready() {
        return DesktopAppUpdateCheckResult {
            ok: false,
            reason: Some("Desktop updates are disabled for this build.".to_string()),
            current_version,
            latest_version: None,
            has_update: false,
        };
    }

    let updater = match app_handle.updater() {
        Ok(updater) => updater,
        Err(error) => {
            let reason = format!("Failed to initialize updater: {error}");
            append_desktop_log(&reason);
            return DesktopAppUpdateCheckResult {
                ok: false,
                reason: Some(reason),
                current_version,
                latest_version: None,
                has_update: false,
            };
        }
    };

    match updater.check().await {
        Ok(Some(update)) => {
            let outcome = update_check::classify_update(&current_version, &update.version);
            let has_update = matches!(outcome, update_check::UpdateOutcome::Available { .. });
            DesktopAppUpdateCheckResult {
                ok: true,
                reason: None,
                current_version,
                latest_version: Some(update.version.clone()),
                has_update,
            }
        }
        Ok(None) => DesktopAppUpdateCheckResult {
            ok: true,
            reason: None,
            current_version: current_version.clone(),
            latest_version: Some(current_version),
            has_update: false,
        },
        Err(error) => {
            // Missing release manifests are normal before the first release; stay quiet.
            append_desktop_log(&format!("desktop update check failed (silent): {error}"));
            DesktopAppUpdateCheckResult {
                ok: true,
                reason: None,
                current_version,
                latest_version: None,
                has_update: false,
            }
        }
    }
}

#[tauri::command]
pub(crate) async fn desktop_bridge_install_desktop_app_update(
    app_handle: AppHandle,
) -> BridgeResult {
    let state = app_handle.state::<ShellState>();
    if !state.config.updater_allowed || !state.is_updater_ready() {
        return BridgeResult::failed("Desktop updates are disabled for this build.");
    }
    let Some(_install_guard) = AtomicFlagGuard::try_set(&state.is_installing_update) else {
        return BridgeResult::failed("Desktop update installation already in progress.");
    };

    let updater = match app_handle.updater() {
        Ok(updater) => updater,
        Err(error) => {
            let reason = format!("Failed to initialize updater: {error}");
            append_desktop_log(&reason);
            return BridgeResult::failed(reason);
        }
    };

    let update = match updater.check().await {
        Ok(Some(update)) => update,
        Ok(None) => return BridgeResult::failed("Already on latest desktop version."),
        Err(error) => {
            let reason = format!("Failed to check desktop app update: {error}");
            append_desktop_log(&reason);
            return BridgeResult::failed(reason);
        }
    };

    let target_version = update.version.clone();
    if let Err(error) = update.download_and_install(|_, _| {}, || {}).await {
        let reason = format!("Failed to install desktop app update: {error}");
        append_desktop_log(&reason);
        return BridgeResult::failed(reason);
    }

    append_desktop_log(&format!(
        "desktop app update installed to version {target_version}; restarting app"
    ));
    state.mark_quitting();
    app_handle.request_restart();
    BridgeResult::ok()
}
