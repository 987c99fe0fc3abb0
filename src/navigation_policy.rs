use std::collections::{HashMap, HashSet};

use url::Url;

use crate::{ALLOWED_NAVIGATION_HOSTS, RESTRICTED_NAVIGATION_PATHS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    InApp,
    OpenExternal,
}

/// Decides whether a URL requested by the client stays in the webview or goes to the
/// system browser. Shared by navigation and new-window interception.
#[derive(Debug, Clone)]
pub struct NavigationPolicy {
    allowed_hosts: HashSet<String>,
    restricted_paths: HashMap<String, HashSet<String>>,
}

fn is_internal_scheme(scheme: &str) -> bool {
    matches!(scheme, "tauri" | "asset" | "ipc" | "about" | "data" | "blob")
}

impl NavigationPolicy {
    pub fn new<'a>(
        app_host: Option<&str>,
        allowed_hosts: impl IntoIterator<Item = &'a str>,
        restricted_paths: impl IntoIterator<Item = (&'a str, &'a [&'a str])>,
    ) -> Self {
        let mut hosts: HashSet<String> = allowed_hosts
            .into_iter()
            .map(|host| host.to_ascii_lowercase())
            .collect();
        if let Some(app_host) = app_host {
            hosts.insert(app_host.to_ascii_lowercase());
        }

        let restricted_paths = restricted_paths
            .into_iter()
            .map(|(host, paths)| {
                (
                    host.to_ascii_lowercase(),
                    paths.iter().map(|path| path.to_string()).collect(),
                )
            })
            .collect();

        Self {
            allowed_hosts: hosts,
            restricted_paths,
        }
    }

    pub fn with_defaults(app_host: Option<&str>) -> Self {
        Self::new(
            app_host,
            ALLOWED_NAVIGATION_HOSTS.iter().copied(),
            RESTRICTED_NAVIGATION_PATHS.iter().copied(),
        )
    }

    pub fn decide(&self, url: &Url) -> NavigationDecision {
        let scheme = url.scheme();
        if is_internal_scheme(scheme) {
            return NavigationDecision::InApp;
        }
        if !matches!(scheme, "http" | "https") {
            return NavigationDecision::OpenExternal;
        }

        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return NavigationDecision::OpenExternal;
        };
        if !self.allowed_hosts.contains(&host) {
            return NavigationDecision::OpenExternal;
        }

        match self.restricted_paths.get(&host) {
            Some(paths) if !paths.contains(url.path()) => NavigationDecision::OpenExternal,
            _ => NavigationDecision::InApp,
        }
    }

    pub fn decide_raw(&self, raw_url: &str) -> Option<NavigationDecision> {
        Url::parse(raw_url.trim()).ok().map(|url| self.decide(&url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> NavigationPolicy {
        NavigationPolicy::with_defaults(Some("app.parley.chat"))
    }

    fn decide(raw: &str) -> NavigationDecision {
        policy().decide_raw(raw).expect("test url should parse")
    }

    #[test]
    fn hosts_outside_allow_list_open_externally() {
        for raw in [
            "https://example.com/",
            "https://youtube.com/watch?v=1",
            "https://evil-parley.chat/",
            "https://www.github.com/login",
            "http://203.0.113.5/",
        ] {
            assert_eq!(decide(raw), NavigationDecision::OpenExternal, "{raw}");
        }
    }

    #[test]
    fn allow_listed_hosts_stay_in_app() {
        assert_eq!(decide("https://app.parley.chat/channels/1"), NavigationDecision::InApp);
        assert_eq!(decide("https://CDN.parley.chat/a.png"), NavigationDecision::InApp);
        assert_eq!(decide("https://parley.chat/"), NavigationDecision::InApp);
    }

    #[test]
    fn restricted_hosts_only_keep_exact_sign_in_paths_in_app() {
        assert_eq!(decide("https://github.com/login"), NavigationDecision::InApp);
        assert_eq!(
            decide("https://github.com/sessions/two-factor?return_to=x"),
            NavigationDecision::InApp
        );
        assert_eq!(
            decide("https://github.com/login/oauth/authorize?client_id=abc"),
            NavigationDecision::InApp
        );

        assert_eq!(decide("https://github.com/"), NavigationDecision::OpenExternal);
        assert_eq!(decide("https://github.com/login/"), NavigationDecision::OpenExternal);
        assert_eq!(
            decide("https://github.com/parley-chat/parley"),
            NavigationDecision::OpenExternal
        );
        assert_eq!(
            decide("https://accounts.google.com/settings"),
            NavigationDecision::OpenExternal
        );
    }

    #[test]
    fn configured_app_host_is_implicitly_allowed() {
        let policy = NavigationPolicy::with_defaults(Some("localhost"));
        assert_eq!(
            policy.decide_raw("http://localhost:5173/"),
            Some(NavigationDecision::InApp)
        );
    }

    #[test]
    fn non_web_schemes_are_split_between_internal_and_external() {
        assert_eq!(decide("about:blank"), NavigationDecision::InApp);
        assert_eq!(decide("tauri://localhost/splash.html"), NavigationDecision::InApp);
        assert_eq!(decide("mailto:support@parley.chat"), NavigationDecision::OpenExternal);
        assert_eq!(decide("steam://run/440"), NavigationDecision::OpenExternal);
    }

    #[test]
    fn decide_raw_rejects_unparsable_urls() {
        assert_eq!(policy().decide_raw("not a url"), None);
    }
}
