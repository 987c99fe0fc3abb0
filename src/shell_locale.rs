use std::{env, path::Path};

use serde::Serialize;
use serde_json::Value;

use crate::{append_desktop_log, desktop_state, DESKTOP_LOCALE_ENV};

const LOCALE_FIELD: &str = "locale";
const AUTO_UPDATE_CHECK_FIELD: &str = "autoUpdateCheck";

#[derive(Debug, Clone, Copy)]
pub struct ShellTexts {
    pub tray_hide: &'static str,
    pub tray_show: &'static str,
    pub tray_reload: &'static str,
    pub tray_auto_update_check_on: &'static str,
    pub tray_auto_update_check_off: &'static str,
    pub tray_quit: &'static str,
    pub tray_voice_disconnected: &'static str,
    pub tray_voice_connected: &'static str,
    pub tray_voice_muted: &'static str,
    pub tray_voice_deafened: &'static str,
}

/// Strings pushed to the splash page; keys match the status names it receives.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct SplashTexts {
    pub checking: &'static str,
    pub up_to_date: &'static str,
    pub update_available: &'static str,
    pub starting: &'static str,
}

pub fn shell_texts_for_locale(locale: &str) -> ShellTexts {
    if locale == "zh-CN" {
        return ShellTexts {
            tray_hide: "隐藏 Parley",
            tray_show: "显示 Parley",
            tray_reload: "重新加载",
            tray_auto_update_check_on: "启动时检查更新：开",
            tray_auto_update_check_off: "启动时检查更新：关",
            tray_quit: "退出",
            tray_voice_disconnected: "Parley",
            tray_voice_connected: "Parley · 语音已连接",
            tray_voice_muted: "Parley · 已静音",
            tray_voice_deafened: "Parley · 已关闭声音",
        };
    }

    ShellTexts {
        tray_hide: "Hide Parley",
        tray_show: "Show Parley",
        tray_reload: "Reload",
        tray_auto_update_check_on: "Check for Updates on Launch: On",
        tray_auto_update_check_off: "Check for Updates on Launch: Off",
        tray_quit: "Quit Parley",
        tray_voice_disconnected: "Parley",
        tray_voice_connected: "Parley · Voice Connected",
        tray_voice_muted: "Parley · Muted",
        tray_voice_deafened: "Parley · Deafened",
    }
}

pub fn splash_texts_for_locale(locale: &str) -> SplashTexts {
    if locale == "zh-CN" {
        return SplashTexts {
            checking: "正在检查更新",
            up_to_date: "已是最新版本",
            update_available: "发现新版本",
            starting: "正在启动",
        };
    }

    SplashTexts {
        checking: "Checking for updates",
        up_to_date: "Up to date",
        update_available: "Update available",
        starting: "Starting",
    }
}

pub fn resolve_shell_locale(
    default_shell_locale: &'static str,
    state_path: Option<&Path>,
) -> &'static str {
    if let Some(locale) = read_cached_shell_locale(state_path) {
        return locale;
    }

    for env_key in [DESKTOP_LOCALE_ENV, "LC_ALL", "LANG"] {
        if let Ok(value) = env::var(env_key) {
            if let Some(locale) = normalize_shell_locale(&value) {
                return locale;
            }
        }
    }

    default_shell_locale
}

pub(crate) fn normalize_shell_locale(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw == "zh-CN" {
        return Some("zh-CN");
    }
    if raw == "en-US" {
        return Some("en-US");
    }

    let lowered = raw.to_ascii_lowercase();
    if lowered.starts_with("zh") {
        return Some("zh-CN");
    }
    if lowered.starts_with("en") {
        return Some("en-US");
    }
    None
}

fn read_cached_shell_locale(state_path: Option<&Path>) -> Option<&'static str> {
    let locale = desktop_state::read_state_field(state_path, LOCALE_FIELD)?;
    normalize_shell_locale(locale.as_str()?)
}

pub(crate) fn write_cached_shell_locale(
    locale: Option<&str>,
    state_path: Option<&Path>,
) -> Result<(), String> {
    let normalized_locale = locale.and_then(normalize_shell_locale);
    if let Some(raw_locale) = locale {
        if normalized_locale.is_none() {
            append_desktop_log(&format!(
                "unsupported shell locale '{}'; clearing cached locale",
                raw_locale
            ));
        }
    }

    desktop_state::write_state_field(
        state_path,
        LOCALE_FIELD,
        normalized_locale.map(|locale| Value::String(locale.to_string())),
    )
}

pub(crate) fn read_cached_auto_update_check_enabled(state_path: Option<&Path>) -> Option<bool> {
    desktop_state::read_state_field(state_path, AUTO_UPDATE_CHECK_FIELD)?.as_bool()
}

pub(crate) fn write_cached_auto_update_check_enabled(
    enabled: bool,
    state_path: Option<&Path>,
) -> Result<(), String> {
    desktop_state::write_state_field(state_path, AUTO_UPDATE_CHECK_FIELD, Some(Value::Bool(enabled)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_texts_for_locale_returns_chinese_copy() {
        let texts = shell_texts_for_locale("zh-CN");
        assert_eq!(texts.tray_hide, "隐藏 Parley");
        assert_eq!(texts.tray_quit, "退出");
    }

    #[test]
    fn shell_texts_for_locale_falls_back_to_english_copy() {
        let texts = shell_texts_for_locale("fr-FR");
        assert_eq!(texts.tray_hide, "Hide Parley");
        assert_eq!(texts.tray_quit, "Quit Parley");
    }

    #[test]
    fn normalize_shell_locale_accepts_language_prefixes() {
        assert_eq!(normalize_shell_locale("EN_us"), Some("en-US"));
        assert_eq!(normalize_shell_locale("zh_TW.UTF-8"), Some("zh-CN"));
        assert_eq!(normalize_shell_locale("fr-FR"), None);
        assert_eq!(normalize_shell_locale("  "), None);
    }

    #[test]
    fn splash_texts_serialize_with_status_keys() {
        let value = serde_json::to_value(splash_texts_for_locale("en-US")).expect("serialize");
        assert_eq!(value["up-to-date"], "Up to date");
        assert_eq!(value["update-available"], "Update available");
        assert_eq!(value["checking"], "Checking for updates");
    }

    #[test]
    fn cached_locale_round_trips_through_state_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("desktop_state.json");

        write_cached_shell_locale(Some("zh_CN"), Some(&path)).expect("write locale");
        assert_eq!(resolve_shell_locale("en-US", Some(&path)), "zh-CN");

        write_cached_shell_locale(Some("klingon"), Some(&path)).expect("clear locale");
        assert_eq!(read_cached_shell_locale(Some(&path)), None);
    }

    #[test]
    fn auto_update_check_flag_is_persisted() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("desktop_state.json");
        assert_eq!(read_cached_auto_update_check_enabled(Some(&path)), None);

        write_cached_auto_update_check_enabled(false, Some(&path)).expect("write flag");
        assert_eq!(read_cached_auto_update_check_enabled(Some(&path)), Some(false));
    }
}
