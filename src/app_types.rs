use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};
use tauri::menu::MenuItem;

use crate::{
    navigation_policy::NavigationPolicy, shell_config::ShellConfig, startup_gate::StartupSignal,
};

#[derive(Clone)]
pub(crate) struct TrayMenuState {
    pub(crate) toggle_item: MenuItem<tauri::Wry>,
    pub(crate) reload_item: MenuItem<tauri::Wry>,
    pub(crate) auto_update_check_item: MenuItem<tauri::Wry>,
    pub(crate) quit_item: MenuItem<tauri::Wry>,
}

/// Process-wide shell state, managed by Tauri and injected into handlers.
#[derive(Debug)]
pub(crate) struct ShellState {
    pub(crate) config: ShellConfig,
    pub(crate) navigation: NavigationPolicy,
    pub(crate) startup: StartupSignal,
    pub(crate) is_quitting: AtomicBool,
    pub(crate) updater_ready: AtomicBool,
    pub(crate) is_installing_update: AtomicBool,
}

impl ShellState {
    pub(crate) fn new(config: ShellConfig) -> Self {
        let navigation = NavigationPolicy::with_defaults(config.app_host());
        Self {
            config,
            navigation,
            startup: StartupSignal::default(),
            is_quitting: AtomicBool::new(false),
            updater_ready: AtomicBool::new(false),
            is_installing_update: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_quitting(&self) -> bool {
        self.is_quitting.load(Ordering::Acquire)
    }

    pub(crate) fn mark_quitting(&self) {
        self.is_quitting.store(true, Ordering::Release);
    }

    pub(crate) fn is_updater_ready(&self) -> bool {
        self.updater_ready.load(Ordering::Acquire)
    }

    pub(crate) fn set_updater_ready(&self, ready: bool) {
        self.updater_ready.store(ready, Ordering::Release);
    }
}

#[derive(Debug)]
pub(crate) struct AutoUpdateCheckState {
    pub(crate) enabled: Mutex<bool>,
}

impl AutoUpdateCheckState {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled: Mutex::new(enabled),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.lock().map(|guard| *guard).unwrap_or(true)
    }

    pub(crate) fn toggle(&self) -> bool {
        match self.enabled.lock() {
            Ok(mut guard) => {
                *guard = !*guard;
                *guard
            }
            Err(_) => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub(crate) struct BridgeResult {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
}

impl BridgeResult {
    pub(crate) fn ok() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}

impl From<Result<(), String>> for BridgeResult {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(reason) => Self::failed(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HostPlatformFlags {
    pub(crate) is_mac: bool,
    pub(crate) is_windows: bool,
    pub(crate) is_linux: bool,
}

impl HostPlatformFlags {
    pub(crate) fn current() -> Self {
        Self {
            is_mac: cfg!(target_os = "macos"),
            is_windows: cfg!(target_os = "windows"),
            is_linux: cfg!(target_os = "linux"),
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DesktopAppUpdateCheckResult {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
    pub(crate) current_version: String,
    pub(crate) latest_version: Option<String>,
    pub(crate) has_update: bool,
}

pub(crate) struct AtomicFlagGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> AtomicFlagGuard<'a> {
    pub(crate) fn try_set(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self { flag })
    }
}

impl Drop for AtomicFlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[test]
    fn atomic_flag_guard_try_set_rejects_double_set_until_drop() {
        let flag = AtomicBool::new(false);

        let guard = AtomicFlagGuard::try_set(&flag).expect("first set should succeed");
        assert!(flag.load(Ordering::Relaxed));
        assert!(AtomicFlagGuard::try_set(&flag).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::Relaxed));
        assert!(AtomicFlagGuard::try_set(&flag).is_some());
    }

    #[test]
    fn auto_update_check_state_toggles() {
        let state = AutoUpdateCheckState::new(true);
        assert!(!state.toggle());
        assert!(!state.is_enabled());
        assert!(state.toggle());
    }

    #[test]
    fn bridge_result_from_result_keeps_reason() {
        assert_eq!(BridgeResult::from(Ok(())), BridgeResult::ok());
        assert_eq!(
            BridgeResult::from(Err("nope".to_string())),
            BridgeResult::failed("nope")
        );
    }

    #[test]
    fn host_platform_flags_serialize_in_camel_case() {
        let value = serde_json::to_value(HostPlatformFlags {
            is_mac: true,
            is_windows: false,
            is_linux: false,
        })
        .expect("serialize flags");
        assert_eq!(value["isMac"], true);
        assert_eq!(value["isWindows"], false);
        assert_eq!(value["isLinux"], false);
    }

    #[test]
    fn shell_state_tracks_quitting() {
        let state = ShellState::new(crate::shell_config::ShellConfig::from_lookup(|_| None));
        assert!(!state.is_quitting());
        state.mark_quitting();
        assert!(state.is_quitting());
    }
}
