use std::time::Duration;

pub(crate) const PRODUCT_NAME: &str = "Parley";

pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const SPLASH_WINDOW_LABEL: &str = "splash";
pub(crate) const TRAY_ID: &str = "parley-tray";

pub(crate) const MAIN_WINDOW_WIDTH: f64 = 1280.0;
pub(crate) const MAIN_WINDOW_HEIGHT: f64 = 720.0;
pub(crate) const MAIN_WINDOW_MIN_WIDTH: f64 = 940.0;
pub(crate) const MAIN_WINDOW_MIN_HEIGHT: f64 = 500.0;

pub(crate) const SPLASH_WINDOW_WIDTH: f64 = 300.0;
pub(crate) const SPLASH_WINDOW_HEIGHT: f64 = 350.0;
pub(crate) const SPLASH_PAGE: &str = "splash.html";

pub(crate) const DEFAULT_WEB_URL: &str = "https://app.parley.chat/";
pub(crate) const DEFAULT_SHELL_LOCALE: &str = "en-US";
pub(crate) const DESKTOP_LOG_FILE: &str = "desktop.log";
pub(crate) const DESKTOP_STATE_FILE: &str = "desktop_state.json";

/// Delay between the client reporting ready and the main window appearing.
pub(crate) const MAIN_WINDOW_REVEAL_DELAY: Duration = Duration::from_millis(700);
/// Upper bound on how long the splash waits for the client's loaded signal.
pub(crate) const MAIN_WINDOW_READY_TIMEOUT: Duration = Duration::from_secs(45);

pub(crate) const SPLASH_LOCALE_EVENT: &str = "splash:locale";
pub(crate) const SPLASH_STATUS_EVENT: &str = "splash:status";
pub(crate) const KEYBIND_PRESSED_EVENT: &str = "keybind:pressed";
pub(crate) const KEYBIND_RELEASED_EVENT: &str = "keybind:released";

pub(crate) const WEB_URL_ENV: &str = "PARLEY_WEB_URL";
pub(crate) const DEV_MODE_ENV: &str = "PARLEY_DEV_MODE";
pub(crate) const DISCORD_CLIENT_ID_ENV: &str = "PARLEY_DISCORD_CLIENT_ID";
pub(crate) const UPDATER_ENV: &str = "PARLEY_UPDATER";
pub(crate) const DESKTOP_ROOT_ENV: &str = "PARLEY_DESKTOP_ROOT";
pub(crate) const DESKTOP_LOCALE_ENV: &str = "PARLEY_DESKTOP_LOCALE";
pub(crate) const LOG_FILTER_ENV: &str = "PARLEY_LOG";

/// Hosts the client may load in-app. Anything else opens in the system browser.
pub(crate) const ALLOWED_NAVIGATION_HOSTS: &[&str] = &[
    "parley.chat",
    "app.parley.chat",
    "api.parley.chat",
    "cdn.parley.chat",
    "status.parley.chat",
    "github.com",
    "accounts.google.com",
];

/// Allow-listed hosts on which only these exact paths stay in-app (sign-in flows).
pub(crate) const RESTRICTED_NAVIGATION_PATHS: &[(&str, &[&str])] = &[
    (
        "github.com",
        &[
            "/login",
            "/login/oauth/authorize",
            "/session",
            "/sessions/two-factor",
            "/sessions/two-factor/app",
            "/sessions/two-factor/webauthn",
        ],
    ),
    (
        "accounts.google.com",
        &[
            "/o/oauth2/auth",
            "/o/oauth2/v2/auth",
            "/signin/oauth",
            "/v3/signin/identifier",
            "/v3/signin/challenge/pwd",
            "/v3/signin/challenge/totp",
        ],
    ),
];
