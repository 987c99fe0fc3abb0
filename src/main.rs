#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
#[cfg(target_os = "macos")]
mod app_menu;
mod app_runtime;
mod app_types;
mod desktop_bridge_commands;
mod desktop_state;
mod external_links;
mod keybinds;
mod logging;
mod main_window;
mod media_permission;
mod navigation_policy;
mod notifications;
mod rich_presence;
mod runtime_paths;
mod shell_config;
mod shell_locale;
mod single_instance;
mod splash_window;
mod startup_gate;
mod startup_task;
mod tray_actions;
mod tray_labels;
mod tray_menu_handler;
mod tray_setup;
mod ui_dispatch;
mod update_check;
mod voice_tray;
mod window_actions;

pub(crate) use app_constants::*;
pub(crate) use app_types::{
    AtomicFlagGuard, AutoUpdateCheckState, BridgeResult, DesktopAppUpdateCheckResult,
    HostPlatformFlags, ShellState, TrayMenuState,
};
pub(crate) use logging::{append_desktop_log, append_shutdown_log, append_startup_log};

fn main() {
    app_runtime::run();
}
