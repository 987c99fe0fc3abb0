use std::time::Instant;

use semver::Version;
use tauri::{AppHandle, Manager};
use tauri_plugin_updater::UpdaterExt;

use crate::{append_startup_log, AutoUpdateCheckState, ShellState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UpdateOutcome {
    /// The check did not run (disabled by the user, the environment, or no updater).
    Skipped,
    NotFound,
    Available { version: String },
}

impl UpdateOutcome {
    pub(crate) fn splash_status(&self) -> &'static str {
        match self {
            UpdateOutcome::Skipped => "starting",
            UpdateOutcome::NotFound => "up-to-date",
            UpdateOutcome::Available { .. } => "update-available",
        }
    }
}

/// An offered release only counts when it is strictly newer than the running build.
pub(crate) fn classify_update(current: &str, latest: &str) -> UpdateOutcome {
    let (Ok(current_version), Ok(latest_version)) = (
        Version::parse(current.trim().trim_start_matches('v')),
        Version::parse(latest.trim().trim_start_matches('v')),
    ) else {
        return UpdateOutcome::NotFound;
    };

    if latest_version > current_version {
        UpdateOutcome::Available {
            version: latest_version.to_string(),
        }
    } else {
        UpdateOutcome::NotFound
    }
}

pub(crate) fn should_run_update_check(
    updater_allowed: bool,
    toggle_enabled: bool,
    updater_ready: bool,
) -> bool {
    updater_allowed && toggle_enabled && updater_ready
}

pub(crate) async fn run_startup_update_check(app_handle: &AppHandle) -> UpdateOutcome {
    let state = app_handle.state::<ShellState>();
    let toggle_enabled = app_handle
        .try_state::<AutoUpdateCheckState>()
        .map(|state| state.is_enabled())
        .unwrap_or(true);
    if !should_run_update_check(
        state.config.updater_allowed,
        toggle_enabled,
        state.is_updater_ready(),
    ) {
        append_startup_log(&format!(
            "[update-check] skipped: env_allowed={} toggle_enabled={} updater_ready={}",
            state.config.updater_allowed,
            toggle_enabled,
            state.is_updater_ready()
        ));
        return UpdateOutcome::Skipped;
    }

    let current_version = app_handle.package_info().version.to_string();
    let updater = match app_handle.updater() {
        Ok(updater) => updater,
        Err(error) => {
            append_startup_log(&format!("[update-check] failed to initialize updater: {error}"));
            return UpdateOutcome::Skipped;
        }
    };

    let check_started = Instant::now();
    let outcome = match updater.check().await {
        Ok(Some(update)) => classify_update(&current_version, &update.version),
        Ok(None) => UpdateOutcome::NotFound,
        Err(error) => {
            // Unreachable endpoints and missing manifests must never hold the splash.
            tracing::warn!(
                current_version = %current_version,
                elapsed_ms = check_started.elapsed().as_millis() as u64,
                "[update-check] check failed: {error}"
            );
            UpdateOutcome::NotFound
        }
    };

    append_startup_log(&format!(
        "[update-check] finished: current_version={} outcome={:?} elapsed_ms={}",
        current_version,
        outcome,
        check_started.elapsed().as_millis()
    ));
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_update_reports_only_strictly_newer_versions() {
        assert_eq!(
            classify_update("1.4.2", "1.5.0"),
            UpdateOutcome::Available {
                version: "1.5.0".to_string()
            }
        );
        assert_eq!(classify_update("1.4.2", "1.4.2"), UpdateOutcome::NotFound);
        assert_eq!(classify_update("1.4.2", "1.3.9"), UpdateOutcome::NotFound);
    }

    #[test]
    fn classify_update_tolerates_v_prefix_and_rejects_garbage() {
        assert_eq!(
            classify_update("v1.4.2", "v1.4.3"),
            UpdateOutcome::Available {
                version: "1.4.3".to_string()
            }
        );
        assert_eq!(classify_update("1.4.2", "latest"), UpdateOutcome::NotFound);
    }

    #[test]
    fn prerelease_is_older_than_its_release() {
        assert_eq!(classify_update("2.0.0", "2.0.0-beta.1"), UpdateOutcome::NotFound);
        assert_eq!(
            classify_update("2.0.0-beta.1", "2.0.0"),
            UpdateOutcome::Available {
                version: "2.0.0".to_string()
            }
        );
    }

    #[test]
    fn update_check_requires_every_gate() {
        assert!(should_run_update_check(true, true, true));
        assert!(!should_run_update_check(false, true, true));
        assert!(!should_run_update_check(true, false, true));
        assert!(!should_run_update_check(true, true, false));
    }

    #[test]
    fn splash_status_matches_outcome() {
        assert_eq!(UpdateOutcome::Skipped.splash_status(), "starting");
        assert_eq!(UpdateOutcome::NotFound.splash_status(), "up-to-date");
        assert_eq!(
            UpdateOutcome::Available {
                version: "9.0.0".to_string()
            }
            .splash_status(),
            "update-available"
        );
    }
}
