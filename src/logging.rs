use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{runtime_paths, DESKTOP_LOG_FILE, LOG_FILTER_ENV};

const DEFAULT_LOG_FILTER: &str = "info";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub(crate) fn resolve_desktop_log_path(data_dir: Option<PathBuf>, file_name: &str) -> PathBuf {
    data_dir
        .unwrap_or_else(std::env::temp_dir)
        .join("logs")
        .join(file_name)
}

fn build_env_filter(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber: stderr plus a daily rolling file next to the desktop state.
pub(crate) fn init() -> PathBuf {
    let log_path = resolve_desktop_log_path(runtime_paths::desktop_data_dir(), DESKTOP_LOG_FILE);
    let filter = build_env_filter(std::env::var(LOG_FILTER_ENV).ok().as_deref());

    let file_layer = log_path.parent().and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        let appender = tracing_appender::rolling::daily(dir, file_name_of(&log_path));
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        Some(fmt::layer().with_ansi(false).with_writer(writer))
    });

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();
    if let Err(error) = result {
        eprintln!("failed to install desktop log subscriber: {error}");
    }

    log_path
}

fn file_name_of(path: &Path) -> &std::ffi::OsStr {
    path.file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new(DESKTOP_LOG_FILE))
}

pub(crate) fn append_desktop_log(message: &str) {
    tracing::info!(target: "parley::desktop", "{message}");
}

pub(crate) fn append_startup_log(message: &str) {
    tracing::info!(target: "parley::startup", "{message}");
}

pub(crate) fn append_shutdown_log(message: &str) {
    tracing::info!(target: "parley::shutdown", "{message}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_desktop_log_path_places_file_under_logs_dir() {
        let path = resolve_desktop_log_path(Some(PathBuf::from("/data/parley")), "desktop.log");
        assert_eq!(path, PathBuf::from("/data/parley/logs/desktop.log"));
    }

    #[test]
    fn resolve_desktop_log_path_falls_back_to_temp_dir() {
        let path = resolve_desktop_log_path(None, "desktop.log");
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with("logs/desktop.log"));
    }

    #[test]
    fn build_env_filter_uses_default_for_blank_or_invalid_input() {
        assert_eq!(build_env_filter(None).to_string(), DEFAULT_LOG_FILTER);
        assert_eq!(build_env_filter(Some("  ")).to_string(), DEFAULT_LOG_FILTER);
        assert_eq!(
            build_env_filter(Some("parley=debug")).to_string(),
            "parley=debug"
        );
    }
}
