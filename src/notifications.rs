use tauri::{AppHandle, Manager};
use tauri_plugin_notification::NotificationExt;

use crate::{MAIN_WINDOW_LABEL, PRODUCT_NAME};

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NotificationRequest {
    pub(crate) title: Option<String>,
    pub(crate) body: String,
    #[serde(default)]
    pub(crate) force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum NotificationOutcome {
    Shown,
    Suppressed,
}

/// The client already surfaces messages in-window; desktop banners are for when it is not
/// focused, unless the caller forces one.
pub(crate) fn should_show_notification(window_focused: bool, force: bool) -> bool {
    force || !window_focused
}

pub(crate) fn notification_title(title: Option<&str>) -> String {
    title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(PRODUCT_NAME)
        .to_string()
}

pub(crate) fn notify(
    app_handle: &AppHandle,
    request: NotificationRequest,
) -> Result<NotificationOutcome, String> {
    let body = request.body.trim();
    if body.is_empty() {
        return Err("Notification body is empty.".to_string());
    }

    let window_focused = app_handle
        .get_webview_window(MAIN_WINDOW_LABEL)
        .and_then(|window| window.is_focused().ok())
        .unwrap_or(false);
    if !should_show_notification(window_focused, request.force) {
        return Ok(NotificationOutcome::Suppressed);
    }

    app_handle
        .notification()
        .builder()
        .title(notification_title(request.title.as_deref()))
        .body(body)
        .show()
        .map_err(|error| format!("Failed to show notification: {error}"))?;
    Ok(NotificationOutcome::Shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focused_window_suppresses_unless_forced() {
        assert!(!should_show_notification(true, false));
        assert!(should_show_notification(true, true));
        assert!(should_show_notification(false, false));
    }

    #[test]
    fn blank_title_falls_back_to_product_name() {
        assert_eq!(notification_title(None), "Parley");
        assert_eq!(notification_title(Some("   ")), "Parley");
        assert_eq!(notification_title(Some(" #general ")), "#general");
    }

    #[test]
    fn request_deserializes_with_default_force() {
        let request: NotificationRequest =
            serde_json::from_str(r#"{"title":"Ana","body":"hi"}"#).expect("parse request");
        assert!(!request.force);
        assert_eq!(request.title.as_deref(), Some("Ana"));
    }
}
