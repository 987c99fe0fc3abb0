use tauri::{AppHandle, Manager};

use crate::{
    append_desktop_log, append_shutdown_log, startup_gate::StartupPhase, window_actions,
    ShellState, MAIN_WINDOW_LABEL, SPLASH_WINDOW_LABEL,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondInstanceAction {
    /// Bring the running window forward; the new process exits without a window.
    Refocus,
    /// Development builds: close the running window and relaunch so the new binary wins.
    ReplaceExisting,
}

pub fn decide_second_instance(dev_mode: bool) -> SecondInstanceAction {
    if dev_mode {
        SecondInstanceAction::ReplaceExisting
    } else {
        SecondInstanceAction::Refocus
    }
}

pub(crate) fn handle_second_instance(app_handle: &AppHandle, argv: &[String]) {
    let state = app_handle.state::<ShellState>();
    let action = decide_second_instance(state.config.dev_mode);
    append_desktop_log(&format!(
        "second instance launched (args={}), action={:?}",
        argv.len(),
        action
    ));

    match action {
        SecondInstanceAction::Refocus => {
            // While the splash is up the main window is still loading; surface the splash.
            if state.startup.phase() == StartupPhase::Loading {
                if let Some(splash) = app_handle.get_webview_window(SPLASH_WINDOW_LABEL) {
                    if let Err(error) = splash.set_focus() {
                        append_desktop_log(&format!("failed to focus splash window: {error}"));
                    }
                    return;
                }
            }
            window_actions::show_main_window(app_handle, append_desktop_log);
        }
        SecondInstanceAction::ReplaceExisting => {
            state.mark_quitting();
            if let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) {
                if let Err(error) = window.close() {
                    append_desktop_log(&format!("failed to close main window for replace: {error}"));
                }
            }
            append_shutdown_log("dev mode: replacing running instance with a fresh launch");
            app_handle.restart();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_builds_refocus_the_existing_window() {
        assert_eq!(decide_second_instance(false), SecondInstanceAction::Refocus);
    }

    #[test]
    fn dev_mode_replaces_the_existing_instance() {
        assert_eq!(
            decide_second_instance(true),
            SecondInstanceAction::ReplaceExisting
        );
    }
}
