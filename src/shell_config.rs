use std::env;

use url::Url;

use crate::{DEFAULT_WEB_URL, DEV_MODE_ENV, DISCORD_CLIENT_ID_ENV, UPDATER_ENV, WEB_URL_ENV};

/// Process-level settings resolved once from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShellConfig {
    pub(crate) web_url: Url,
    pub(crate) dev_mode: bool,
    pub(crate) discord_client_id: Option<String>,
    pub(crate) updater_allowed: bool,
}

fn parse_flag(raw: Option<&str>) -> Option<bool> {
    let normalized = raw?.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn normalize_web_url(raw: Option<&str>) -> Url {
    let parsed = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| Url::parse(value).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some());

    match parsed {
        Some(url) => url,
        None => Url::parse(DEFAULT_WEB_URL).expect("DEFAULT_WEB_URL is a valid url"),
    }
}

impl ShellConfig {
    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let web_url = normalize_web_url(lookup(WEB_URL_ENV).as_deref());
        let dev_mode = parse_flag(lookup(DEV_MODE_ENV).as_deref()).unwrap_or(false);
        let discord_client_id = lookup(DISCORD_CLIENT_ID_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()));
        let updater_allowed = parse_flag(lookup(UPDATER_ENV).as_deref()).unwrap_or(true);

        Self {
            web_url,
            dev_mode,
            discord_client_id,
            updater_allowed,
        }
    }

    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn app_host(&self) -> Option<&str> {
        self.web_url.host_str()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(pairs: &[(&str, &str)]) -> ShellConfig {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ShellConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_with(&[]);
        assert_eq!(config.web_url.as_str(), DEFAULT_WEB_URL);
        assert!(!config.dev_mode);
        assert!(config.updater_allowed);
        assert_eq!(config.discord_client_id, None);
        assert_eq!(config.app_host(), Some("app.parley.chat"));
    }

    #[test]
    fn web_url_override_requires_http_scheme() {
        let config = config_with(&[(WEB_URL_ENV, "http://localhost:5173/")]);
        assert_eq!(config.web_url.as_str(), "http://localhost:5173/");
        assert_eq!(config.app_host(), Some("localhost"));

        let config = config_with(&[(WEB_URL_ENV, "file:///etc/passwd")]);
        assert_eq!(config.web_url.as_str(), DEFAULT_WEB_URL);
    }

    #[test]
    fn flags_accept_common_spellings() {
        let config = config_with(&[(DEV_MODE_ENV, " YES "), (UPDATER_ENV, "0")]);
        assert!(config.dev_mode);
        assert!(!config.updater_allowed);

        let config = config_with(&[(DEV_MODE_ENV, "maybe")]);
        assert!(!config.dev_mode);
    }

    #[test]
    fn discord_client_id_must_be_numeric() {
        let config = config_with(&[(DISCORD_CLIENT_ID_ENV, " 1234567890 ")]);
        assert_eq!(config.discord_client_id.as_deref(), Some("1234567890"));

        let config = config_with(&[(DISCORD_CLIENT_ID_ENV, "abc")]);
        assert_eq!(config.discord_client_id, None);
    }
}
