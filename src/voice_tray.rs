use std::sync::Mutex;

use tauri::{image::Image, AppHandle, Manager};

use crate::{runtime_paths, shell_locale, DEFAULT_SHELL_LOCALE, TRAY_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceStatus {
    #[default]
    Disconnected,
    Connected,
    Muted,
    Deafened,
}

#[derive(Debug, Default)]
pub(crate) struct VoiceTrayState {
    status: Mutex<VoiceStatus>,
}

impl VoiceTrayState {
    pub(crate) fn current(&self) -> VoiceStatus {
        self.status.lock().map(|guard| *guard).unwrap_or_default()
    }

    /// Stores the new status and reports whether it differs from the previous one.
    pub(crate) fn replace(&self, status: VoiceStatus) -> bool {
        match self.status.lock() {
            Ok(mut guard) => {
                let changed = *guard != status;
                *guard = status;
                changed
            }
            Err(_) => true,
        }
    }
}

pub fn icon_for_status(status: VoiceStatus) -> Image<'static> {
    match status {
        VoiceStatus::Disconnected => tauri::include_image!("./icons/tray.png"),
        VoiceStatus::Connected => tauri::include_image!("./icons/tray-connected.png"),
        VoiceStatus::Muted => tauri::include_image!("./icons/tray-muted.png"),
        VoiceStatus::Deafened => tauri::include_image!("./icons/tray-deafened.png"),
    }
}

pub fn tooltip_for_status(texts: &shell_locale::ShellTexts, status: VoiceStatus) -> &'static str {
    match status {
        VoiceStatus::Disconnected => texts.tray_voice_disconnected,
        VoiceStatus::Connected => texts.tray_voice_connected,
        VoiceStatus::Muted => texts.tray_voice_muted,
        VoiceStatus::Deafened => texts.tray_voice_deafened,
    }
}

fn apply_voice_status(app_handle: &AppHandle, status: VoiceStatus) -> Result<(), String> {
    let Some(tray) = app_handle.tray_by_id(TRAY_ID) else {
        return Err("Tray icon is not available.".to_string());
    };

    let locale = shell_locale::resolve_shell_locale(
        DEFAULT_SHELL_LOCALE,
        runtime_paths::desktop_state_path().as_deref(),
    );
    let texts = shell_locale::shell_texts_for_locale(locale);

    tray.set_icon(Some(icon_for_status(status)))
        .map_err(|error| format!("Failed to update tray icon: {error}"))?;
    #[cfg(target_os = "macos")]
    tray.set_icon_as_template(status == VoiceStatus::Disconnected)
        .map_err(|error| format!("Failed to update tray icon template mode: {error}"))?;
    tray.set_tooltip(Some(tooltip_for_status(&texts, status)))
        .map_err(|error| format!("Failed to update tray tooltip: {error}"))
}

pub(crate) fn set_voice_status(app_handle: &AppHandle, status: VoiceStatus) -> Result<(), String> {
    if !app_handle.state::<VoiceTrayState>().replace(status) {
        return Ok(());
    }
    apply_voice_status(app_handle, status)?;
    tracing::debug!(status = ?status, "voice tray status updated");
    Ok(())
}

/// Re-applies the current status, e.g. after the shell locale changed the tooltip text.
pub(crate) fn refresh_voice_tray(app_handle: &AppHandle) -> Result<(), String> {
    let status = app_handle.state::<VoiceTrayState>().current();
    apply_voice_status(app_handle, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_status_deserializes_from_lowercase() {
        let status: VoiceStatus = serde_json::from_str("\"muted\"").expect("parse status");
        assert_eq!(status, VoiceStatus::Muted);
        assert!(serde_json::from_str::<VoiceStatus>("\"speaking\"").is_err());
    }

    #[test]
    fn replace_reports_changes_only() {
        let state = VoiceTrayState::default();
        assert_eq!(state.current(), VoiceStatus::Disconnected);
        assert!(!state.replace(VoiceStatus::Disconnected));
        assert!(state.replace(VoiceStatus::Connected));
        assert!(!state.replace(VoiceStatus::Connected));
        assert_eq!(state.current(), VoiceStatus::Connected);
    }

    #[test]
    fn tooltip_matches_status() {
        let texts = shell_locale::shell_texts_for_locale("en-US");
        assert_eq!(
            tooltip_for_status(&texts, VoiceStatus::Deafened),
            "Parley · Deafened"
        );
        assert_eq!(tooltip_for_status(&texts, VoiceStatus::Disconnected), "Parley");
    }
}
