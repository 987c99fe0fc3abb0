use tauri::{webview::PageLoadEvent, AppHandle, Manager, RunEvent, WindowEvent};

use crate::{
    append_desktop_log, append_shutdown_log, append_startup_log, keybinds, logging,
    rich_presence::PresenceState, runtime_paths, shell_config::ShellConfig, shell_locale,
    single_instance, splash_window, startup_task, tray_setup, voice_tray::VoiceTrayState,
    window_actions, AutoUpdateCheckState, ShellState, MAIN_WINDOW_LABEL, SPLASH_WINDOW_LABEL,
};

fn handle_exit_requested(app_handle: &AppHandle, api: &tauri::ExitRequestApi, code: Option<i32>) {
    let state = app_handle.state::<ShellState>();
    if code.is_none() && !state.is_quitting() {
        // Closing the last window keeps the shell resident in the tray.
        api.prevent_exit();
        return;
    }
    state.mark_quitting();
    append_shutdown_log(&format!("exit requested (code={code:?})"));
}

fn handle_exit(app_handle: &AppHandle) {
    app_handle.state::<ShellState>().mark_quitting();
    if let Err(error) = app_handle.state::<PresenceState>().clear_if_connected() {
        append_shutdown_log(&format!("failed to clear rich presence on exit: {error}"));
    }
    append_shutdown_log("desktop process exiting");
}

pub(crate) fn run() {
    let log_path = logging::init();
    let config = ShellConfig::from_env();
    let state_path = runtime_paths::desktop_state_path();
    let auto_update_check_enabled =
        shell_locale::read_cached_auto_update_check_enabled(state_path.as_deref()).unwrap_or(true);

    append_startup_log("desktop process starting");
    append_startup_log(&format!("desktop log path: {}", log_path.display()));
    append_startup_log(&format!(
        "web url: {} (dev_mode={}, updater_allowed={}, rich_presence={})",
        config.web_url,
        config.dev_mode,
        config.updater_allowed,
        config.discord_client_id.is_some()
    ));

    let presence_state = PresenceState::new(config.discord_client_id.clone());
    let builder = tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, argv, _cwd| {
            single_instance::handle_second_instance(app, &argv);
        }))
        .plugin(tauri_plugin_process::init())
        .plugin(tauri_plugin_notification::init())
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, shortcut, event| {
                    keybinds::handle_shortcut_event(app, shortcut, event)
                })
                .build(),
        )
        .manage(ShellState::new(config))
        .manage(AutoUpdateCheckState::new(auto_update_check_enabled))
        .manage(keybinds::KeybindState::default())
        .manage(VoiceTrayState::default())
        .manage(splash_window::SplashStatusState::default())
        .manage(presence_state);

    #[cfg(target_os = "macos")]
    let builder = builder
        .menu(crate::app_menu::build_app_menu)
        .on_menu_event(|app, event| {
            crate::app_menu::handle_app_menu_event(app, event.id().as_ref())
        });

    builder
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_is_desktop_runtime,
            crate::desktop_bridge_commands::desktop_bridge_host_platform,
            crate::desktop_bridge_commands::desktop_bridge_request_microphone_permission,
            crate::desktop_bridge_commands::desktop_bridge_window_minimize,
            crate::desktop_bridge_commands::desktop_bridge_window_maximize,
            crate::desktop_bridge_commands::desktop_bridge_window_quit,
            crate::desktop_bridge_commands::desktop_bridge_window_loaded,
            crate::desktop_bridge_commands::desktop_bridge_open_url,
            crate::desktop_bridge_commands::desktop_bridge_open_external_url,
            crate::desktop_bridge_commands::desktop_bridge_set_shell_locale,
            crate::desktop_bridge_commands::desktop_bridge_notify,
            crate::desktop_bridge_commands::desktop_bridge_set_voice_state,
            crate::desktop_bridge_commands::desktop_bridge_set_presence,
            crate::desktop_bridge_commands::desktop_bridge_clear_presence,
            crate::desktop_bridge_commands::desktop_bridge_get_keybinds,
            crate::desktop_bridge_commands::desktop_bridge_set_keybind,
            crate::desktop_bridge_commands::desktop_bridge_check_desktop_app_update,
            crate::desktop_bridge_commands::desktop_bridge_install_desktop_app_update,
        ])
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }

            match event {
                WindowEvent::CloseRequested { api, .. } => {
                    let app_handle = window.app_handle();
                    if app_handle.state::<ShellState>().is_quitting() {
                        return;
                    }

                    api.prevent_close();
                    window_actions::hide_main_window(app_handle, append_desktop_log);
                }
                WindowEvent::Focused(false) => {
                    if let Ok(true) = window.is_minimized() {
                        let app_handle = window.app_handle();
                        if !app_handle.state::<ShellState>().is_quitting() {
                            window_actions::hide_main_window(app_handle, append_desktop_log);
                        }
                    }
                }
                _ => {}
            }
        })
        .on_page_load(|webview, payload| match payload.event() {
            PageLoadEvent::Started => {
                if webview.label() == MAIN_WINDOW_LABEL {
                    append_desktop_log(&format!("page-load started: {}", payload.url()));
                }
            }
            PageLoadEvent::Finished => {
                if webview.label() == SPLASH_WINDOW_LABEL {
                    if let Err(error) = splash_window::push_splash_texts(webview.app_handle()) {
                        append_startup_log(&error);
                    }
                    if let Err(error) = splash_window::replay_splash_status(webview.app_handle()) {
                        append_startup_log(&error);
                    }
                } else {
                    append_desktop_log(&format!("page-load finished: {}", payload.url()));
                }
            }
        })
        .setup(move |app| {
            let app_handle = app.handle().clone();

            let updater_allowed = app_handle.state::<ShellState>().config.updater_allowed;
            if updater_allowed {
                match app_handle.plugin(tauri_plugin_updater::Builder::new().build()) {
                    Ok(()) => app_handle.state::<ShellState>().set_updater_ready(true),
                    Err(error) => {
                        append_startup_log(&format!("failed to initialize updater plugin: {error}"))
                    }
                }
            }

            if let Err(error) = tray_setup::setup_tray(&app_handle) {
                append_startup_log(&format!("failed to initialize tray: {error}"));
            }

            if let Err(error) = keybinds::register_keybinds(&app_handle, keybinds::load_keybinds())
            {
                append_startup_log(&format!("failed to register keybinds: {error}"));
            }

            if let Err(error) = splash_window::create_splash_window(&app_handle) {
                append_startup_log(&error);
            }

            startup_task::spawn_startup_task(app_handle, append_startup_log);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { api, code, .. } => {
                handle_exit_requested(app_handle, &api, code);
            }
            RunEvent::Exit => handle_exit(app_handle),
            _ => {}
        });
}
