use std::sync::Mutex;

use tauri::{AppHandle, Emitter, Manager, WebviewUrl, WebviewWindowBuilder};

use crate::{
    runtime_paths, shell_locale, DEFAULT_SHELL_LOCALE, PRODUCT_NAME, SPLASH_LOCALE_EVENT,
    SPLASH_PAGE, SPLASH_STATUS_EVENT, SPLASH_WINDOW_HEIGHT, SPLASH_WINDOW_LABEL,
    SPLASH_WINDOW_WIDTH,
};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub(crate) struct SplashStatusPayload {
    status: String,
    version: Option<String>,
}

/// Last status pushed to the splash. Events are not buffered, so a splash page that finishes
/// loading after a push gets it replayed from here.
#[derive(Debug, Default)]
pub(crate) struct SplashStatusState {
    last: Mutex<Option<SplashStatusPayload>>,
}

impl SplashStatusState {
    pub(crate) fn record(&self, status: &str, version: Option<&str>) -> SplashStatusPayload {
        let payload = SplashStatusPayload {
            status: status.to_string(),
            version: version.map(str::to_string),
        };
        if let Ok(mut guard) = self.last.lock() {
            *guard = Some(payload.clone());
        }
        payload
    }

    pub(crate) fn last(&self) -> Option<SplashStatusPayload> {
        self.last.lock().ok().and_then(|guard| guard.clone())
    }
}

pub(crate) fn create_splash_window(app_handle: &AppHandle) -> Result<(), String> {
    if app_handle.get_webview_window(SPLASH_WINDOW_LABEL).is_some() {
        return Ok(());
    }

    WebviewWindowBuilder::new(
        app_handle,
        SPLASH_WINDOW_LABEL,
        WebviewUrl::App(SPLASH_PAGE.into()),
    )
    .title(PRODUCT_NAME)
    .inner_size(SPLASH_WINDOW_WIDTH, SPLASH_WINDOW_HEIGHT)
    .resizable(false)
    .maximizable(false)
    .decorations(false)
    .always_on_top(true)
    .skip_taskbar(true)
    .center()
    .transparent(true)
    .build()
    .map(|_| ())
    .map_err(|error| format!("Failed to create splash window: {error}"))
}

/// Pushes the localized splash strings; safe to call again after a locale change.
pub(crate) fn push_splash_texts(app_handle: &AppHandle) -> Result<(), String> {
    let locale = shell_locale::resolve_shell_locale(
        DEFAULT_SHELL_LOCALE,
        runtime_paths::desktop_state_path().as_deref(),
    );
    app_handle
        .emit_to(
            SPLASH_WINDOW_LABEL,
            SPLASH_LOCALE_EVENT,
            shell_locale::splash_texts_for_locale(locale),
        )
        .map_err(|error| format!("Failed to push splash texts: {error}"))
}

pub(crate) fn push_splash_status(
    app_handle: &AppHandle,
    status: &str,
    version: Option<&str>,
) -> Result<(), String> {
    let payload = match app_handle.try_state::<SplashStatusState>() {
        Some(state) => state.record(status, version),
        None => SplashStatusState::default().record(status, version),
    };
    emit_splash_status(app_handle, &payload)
}

/// Re-sends the last recorded status; called once the splash page has its listeners.
pub(crate) fn replay_splash_status(app_handle: &AppHandle) -> Result<(), String> {
    let Some(payload) = app_handle
        .try_state::<SplashStatusState>()
        .and_then(|state| state.last())
    else {
        return Ok(());
    };
    emit_splash_status(app_handle, &payload)
}

fn emit_splash_status(app_handle: &AppHandle, payload: &SplashStatusPayload) -> Result<(), String> {
    app_handle
        .emit_to(SPLASH_WINDOW_LABEL, SPLASH_STATUS_EVENT, payload)
        .map_err(|error| {
            format!(
                "Failed to push splash status '{}': {error}",
                payload.status
            )
        })
}

pub(crate) fn close_splash_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(SPLASH_WINDOW_LABEL) else {
        return;
    };

    if let Err(error) = window.close() {
        log(&format!("failed to close splash window: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_splash_is_enabled_for_macos_bundles() {
        let config: serde_json::Value =
            serde_json::from_str(include_str!("../tauri.conf.json")).expect("parse tauri.conf.json");
        assert_eq!(config["app"]["macOSPrivateApi"], serde_json::json!(true));
    }

    #[test]
    fn status_state_starts_empty() {
        assert_eq!(SplashStatusState::default().last(), None);
    }

    #[test]
    fn status_state_keeps_only_the_latest_push() {
        let state = SplashStatusState::default();
        state.record("checking", None);
        state.record("update-available", Some("1.5.0"));
        state.record("starting", None);

        let last = state.last().expect("recorded status");
        assert_eq!(last.status, "starting");
        assert_eq!(last.version, None);
    }

    #[test]
    fn status_payload_serializes_for_the_splash_page() {
        let payload = SplashStatusState::default().record("update-available", Some("1.5.0"));
        assert_eq!(
            serde_json::to_value(payload).expect("serialize status"),
            serde_json::json!({ "status": "update-available", "version": "1.5.0" })
        );
    }
}
