pub const TRAY_MENU_TOGGLE_WINDOW: &str = "tray_toggle_window";
pub const TRAY_MENU_RELOAD_WINDOW: &str = "tray_reload_window";
pub const TRAY_MENU_TOGGLE_AUTO_UPDATE_CHECK: &str = "tray_toggle_auto_update_check";
pub const TRAY_MENU_QUIT: &str = "tray_quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayMenuAction {
    ToggleWindow,
    ReloadWindow,
    ToggleAutoUpdateCheck,
    Quit,
}

pub fn action_from_menu_id(menu_id: &str) -> Option<TrayMenuAction> {
    match menu_id {
        TRAY_MENU_TOGGLE_WINDOW => Some(TrayMenuAction::ToggleWindow),
        TRAY_MENU_RELOAD_WINDOW => Some(TrayMenuAction::ReloadWindow),
        TRAY_MENU_TOGGLE_AUTO_UPDATE_CHECK => Some(TrayMenuAction::ToggleAutoUpdateCheck),
        TRAY_MENU_QUIT => Some(TrayMenuAction::Quit),
        _ => None,
    }
}
