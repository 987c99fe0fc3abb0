use tauri::{AppHandle, Manager, Runtime, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use url::Url;

use crate::{
    append_desktop_log, external_links,
    navigation_policy::{NavigationDecision, NavigationPolicy},
    ShellState, MAIN_WINDOW_HEIGHT, MAIN_WINDOW_LABEL, MAIN_WINDOW_MIN_HEIGHT,
    MAIN_WINDOW_MIN_WIDTH, MAIN_WINDOW_WIDTH, PRODUCT_NAME,
};

/// Routes `window.open` and `target=_blank` links through the shell so the navigation policy
/// also covers new-window requests.
const NEW_WINDOW_BRIDGE_SCRIPT: &str = r#"
(function () {
  if (window.__PARLEY_NEW_WINDOW_BRIDGE__) return;
  window.__PARLEY_NEW_WINDOW_BRIDGE__ = true;

  function openThroughShell(rawUrl) {
    var internals = window.__TAURI_INTERNALS__;
    if (!internals || !rawUrl) return;
    var absolute = new URL(String(rawUrl), window.location.href).href;
    internals.invoke("desktop_bridge_open_url", { url: absolute });
  }

  window.open = function (url) {
    openThroughShell(url);
    return null;
  };

  document.addEventListener(
    "click",
    function (event) {
      var target = event.target;
      var anchor = target && target.closest ? target.closest("a[target='_blank']") : null;
      if (!anchor || !anchor.href) return;
      event.preventDefault();
      openThroughShell(anchor.href);
    },
    true
  );
})();
"#;

/// Returns whether the webview may continue; external URLs are handed to `open_external`.
pub(crate) fn handle_navigation_request<O>(
    policy: &NavigationPolicy,
    url: &Url,
    mut open_external: O,
) -> bool
where
    O: FnMut(&str),
{
    match policy.decide(url) {
        NavigationDecision::InApp => true,
        NavigationDecision::OpenExternal => {
            open_external(url.as_str());
            false
        }
    }
}

fn open_externally_logged(url: &str) {
    append_desktop_log(&format!("redirecting navigation to system browser: {url}"));
    if let Err(error) = external_links::open_external(url) {
        append_desktop_log(&format!("failed to open external url {url}: {error}"));
    }
}

/// Creates the hidden main window, or returns the existing one so that a second window is
/// never built.
pub(crate) fn ensure_main_window<R: Runtime>(
    app_handle: &AppHandle<R>,
) -> Result<WebviewWindow<R>, String> {
    if let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) {
        return Ok(window);
    }

    let state = app_handle.state::<ShellState>();
    let web_url = state.config.web_url.clone();
    let navigation = state.navigation.clone();

    WebviewWindowBuilder::new(app_handle, MAIN_WINDOW_LABEL, WebviewUrl::External(web_url))
        .title(PRODUCT_NAME)
        .inner_size(MAIN_WINDOW_WIDTH, MAIN_WINDOW_HEIGHT)
        .min_inner_size(MAIN_WINDOW_MIN_WIDTH, MAIN_WINDOW_MIN_HEIGHT)
        .visible(false)
        .center()
        .initialization_script(NEW_WINDOW_BRIDGE_SCRIPT)
        .on_navigation(move |url| handle_navigation_request(&navigation, url, open_externally_logged))
        .build()
        .map_err(|error| format!("Failed to create main window: {error}"))
}

pub(crate) fn show_main_window<R, F>(app_handle: &AppHandle<R>, log: F)
where
    R: Runtime,
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("show_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.show() {
        log(&format!("failed to show main window: {error}"));
    }
    if let Err(error) = window.unminimize() {
        log(&format!("failed to unminimize main window: {error}"));
    }
    focus_main_window(app_handle, log);
}

pub(crate) fn focus_main_window<R, F>(app_handle: &AppHandle<R>, log: F)
where
    R: Runtime,
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        return;
    };

    if let Err(error) = window.set_focus() {
        log(&format!("failed to focus main window: {error}"));
    }
}

pub(crate) fn hide_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("hide_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.hide() {
        log(&format!("failed to hide main window: {error}"));
    }
}

pub(crate) fn reload_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("reload_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.reload() {
        log(&format!("failed to reload main window: {error}"));
    }
}

pub(crate) fn navigate_main_window(app_handle: &AppHandle, url: Url) -> Result<(), String> {
    let window = app_handle
        .get_webview_window(MAIN_WINDOW_LABEL)
        .ok_or_else(|| "Main window is not available.".to_string())?;
    window
        .navigate(url)
        .map_err(|error| format!("Failed to navigate main window: {error}"))
}

pub(crate) fn minimize_main_window(app_handle: &AppHandle) -> Result<(), String> {
    let window = app_handle
        .get_webview_window(MAIN_WINDOW_LABEL)
        .ok_or_else(|| "Main window is not available.".to_string())?;
    window
        .minimize()
        .map_err(|error| format!("Failed to minimize main window: {error}"))
}

/// Maximizes the main window, or restores it when it is already maximized.
pub(crate) fn toggle_maximize_main_window(app_handle: &AppHandle) -> Result<bool, String> {
    let window = app_handle
        .get_webview_window(MAIN_WINDOW_LABEL)
        .ok_or_else(|| "Main window is not available.".to_string())?;
    let maximized = window
        .is_maximized()
        .map_err(|error| format!("Failed to read main window state: {error}"))?;

    if maximized {
        window
            .unmaximize()
            .map_err(|error| format!("Failed to restore main window: {error}"))?;
    } else {
        window
            .maximize()
            .map_err(|error| format!("Failed to maximize main window: {error}"))?;
    }
    Ok(!maximized)
}

/// Window state change applied once the client reports it has loaded. A hidden window is left
/// alone here; the startup reveal calls this again right after showing it.
pub(crate) fn apply_loaded_window_state<R, F>(app_handle: &AppHandle<R>, log: F)
where
    R: Runtime,
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        return;
    };

    if !window.is_visible().unwrap_or(false) {
        return;
    }

    #[cfg(not(target_os = "macos"))]
    if let Err(error) = window.unminimize() {
        log(&format!("failed to unminimize main window after load: {error}"));
    }

    focus_main_window(app_handle, log);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> NavigationPolicy {
        NavigationPolicy::with_defaults(Some("app.parley.chat"))
    }

    fn run(raw: &str) -> (bool, Vec<String>) {
        let url = Url::parse(raw).expect("valid test url");
        let mut opened = Vec::new();
        let allowed = handle_navigation_request(&policy(), &url, |external| {
            opened.push(external.to_string())
        });
        (allowed, opened)
    }

    #[test]
    fn foreign_host_is_blocked_and_opened_externally() {
        let (allowed, opened) = run("https://example.com/article");
        assert!(!allowed);
        assert_eq!(opened, vec!["https://example.com/article".to_string()]);
    }

    #[test]
    fn client_host_navigates_in_app_without_external_open() {
        let (allowed, opened) = run("https://app.parley.chat/settings");
        assert!(allowed);
        assert!(opened.is_empty());
    }

    #[test]
    fn restricted_host_paths_split_between_app_and_browser() {
        let (allowed, opened) = run("https://github.com/session");
        assert!(allowed);
        assert!(opened.is_empty());

        let (allowed, opened) = run("https://github.com/settings/profile");
        assert!(!allowed);
        assert_eq!(opened.len(), 1);
    }

    fn mock_app() -> tauri::App<tauri::test::MockRuntime> {
        tauri::test::mock_builder()
            .manage(ShellState::new(crate::shell_config::ShellConfig::from_lookup(
                |_| None,
            )))
            .build(tauri::test::mock_context(tauri::test::noop_assets()))
            .expect("build mock app")
    }

    #[test]
    fn repeated_ensure_reuses_the_main_window() {
        let app = mock_app();

        let first = ensure_main_window(app.handle()).expect("create main window");
        let second = ensure_main_window(app.handle()).expect("reuse main window");

        assert_eq!(first.label(), MAIN_WINDOW_LABEL);
        assert_eq!(second.label(), MAIN_WINDOW_LABEL);
        assert_eq!(app.webview_windows().len(), 1);
    }

    #[test]
    fn loaded_state_is_a_no_op_without_a_main_window() {
        let app = mock_app();
        let logged = std::cell::RefCell::new(Vec::<String>::new());
        apply_loaded_window_state(app.handle(), |line| logged.borrow_mut().push(line.to_string()));
        assert!(logged.borrow().is_empty());
        assert!(app.webview_windows().is_empty());
    }

    #[test]
    fn new_window_bridge_targets_open_url_command() {
        assert!(NEW_WINDOW_BRIDGE_SCRIPT.contains("desktop_bridge_open_url"));
        assert!(NEW_WINDOW_BRIDGE_SCRIPT.contains("window.open"));
    }
}
