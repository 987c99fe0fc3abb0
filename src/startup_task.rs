use std::time::{Duration, Instant};

use tauri::{AppHandle, Manager};

use crate::{
    main_window, splash_window,
    startup_gate::{ReadyOutcome, RevealSchedule},
    ui_dispatch, update_check, window_actions, ShellState, MAIN_WINDOW_READY_TIMEOUT,
    MAIN_WINDOW_REVEAL_DELAY,
};

const STATUS_CHECKING: &str = "checking";
const STATUS_STARTING: &str = "starting";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RevealStep {
    ShowMainWindow,
    ApplyLoadedState,
    CloseSplash,
}

/// The loaded-state change is deferred while the window is hidden, so it runs after the show.
fn reveal_steps(quitting: bool) -> &'static [RevealStep] {
    if quitting {
        return &[];
    }
    &[
        RevealStep::ShowMainWindow,
        RevealStep::ApplyLoadedState,
        RevealStep::CloseSplash,
    ]
}

/// How long to keep the splash up once the wait is over. A timed-out wait reveals at once.
fn reveal_wait(outcome: ReadyOutcome, ready_at: Instant, now: Instant) -> Duration {
    if outcome == ReadyOutcome::TimedOut {
        return Duration::ZERO;
    }
    let mut schedule = RevealSchedule::new(MAIN_WINDOW_REVEAL_DELAY);
    schedule.mark_ready(ready_at);
    if schedule.should_show(now) {
        return Duration::ZERO;
    }
    schedule.remaining(now).unwrap_or(Duration::ZERO)
}

pub(crate) fn spawn_startup_task<F>(app_handle: AppHandle, log: F)
where
    F: Fn(&str) + Send + Sync + Copy + 'static,
{
    tauri::async_runtime::spawn(async move {
        run_startup_sequence(app_handle, log).await;
    });
}

async fn run_startup_sequence<F>(app_handle: AppHandle, log: F)
where
    F: Fn(&str) + Send + Sync + Copy + 'static,
{
    let push_status = |status: &str, version: Option<&str>| {
        if let Err(error) = splash_window::push_splash_status(&app_handle, status, version) {
            log(&error);
        }
    };

    push_status(STATUS_CHECKING, None);
    let outcome = update_check::run_startup_update_check(&app_handle).await;
    let offered_version = match &outcome {
        update_check::UpdateOutcome::Available { version } => Some(version.as_str()),
        _ => None,
    };
    push_status(outcome.splash_status(), offered_version);

    if let Err(error) = main_window::ensure_main_window(&app_handle) {
        log(&format!("startup failed: {error}"));
        splash_window::close_splash_window(&app_handle, log);
        app_handle.exit(1);
        return;
    }
    push_status(STATUS_STARTING, None);

    let wait_started = Instant::now();
    let ready = app_handle
        .state::<ShellState>()
        .startup
        .wait_until_ready(MAIN_WINDOW_READY_TIMEOUT)
        .await;
    if ready == ReadyOutcome::TimedOut {
        log(&format!(
            "main window did not report loaded within {}s; revealing anyway",
            MAIN_WINDOW_READY_TIMEOUT.as_secs()
        ));
    } else {
        log(&format!(
            "main window reported loaded after {}ms",
            wait_started.elapsed().as_millis()
        ));
    }

    let now = Instant::now();
    let delay = reveal_wait(ready, now, now);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let dispatched = ui_dispatch::run_on_main_thread_dispatch(
        &app_handle,
        "reveal main window",
        move |main_app| {
            let quitting = main_app.state::<ShellState>().is_quitting();
            for step in reveal_steps(quitting) {
                match step {
                    RevealStep::ShowMainWindow => window_actions::show_main_window(main_app, log),
                    RevealStep::ApplyLoadedState => {
                        main_window::apply_loaded_window_state(main_app, log)
                    }
                    RevealStep::CloseSplash => splash_window::close_splash_window(main_app, log),
                }
            }
        },
    );
    if let Err(error) = dispatched {
        log(&error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_window_waits_for_the_transition_delay() {
        let ready_at = Instant::now();
        assert_eq!(
            reveal_wait(ReadyOutcome::Ready, ready_at, ready_at),
            MAIN_WINDOW_REVEAL_DELAY
        );
        assert_eq!(
            reveal_wait(
                ReadyOutcome::Ready,
                ready_at,
                ready_at + Duration::from_millis(200)
            ),
            MAIN_WINDOW_REVEAL_DELAY - Duration::from_millis(200)
        );
    }

    #[test]
    fn delay_already_elapsed_reveals_immediately() {
        let ready_at = Instant::now();
        assert_eq!(
            reveal_wait(
                ReadyOutcome::Ready,
                ready_at,
                ready_at + MAIN_WINDOW_REVEAL_DELAY * 2
            ),
            Duration::ZERO
        );
    }

    #[test]
    fn reveal_applies_loaded_state_after_showing() {
        let steps = reveal_steps(false);
        let shown = steps
            .iter()
            .position(|step| *step == RevealStep::ShowMainWindow)
            .expect("show step");
        let applied = steps
            .iter()
            .position(|step| *step == RevealStep::ApplyLoadedState)
            .expect("loaded state step");
        assert!(shown < applied);
        assert_eq!(steps.last(), Some(&RevealStep::CloseSplash));
    }

    #[test]
    fn quitting_skips_the_reveal() {
        assert!(reveal_steps(true).is_empty());
    }

    #[test]
    fn timed_out_wait_skips_the_transition_delay() {
        let now = Instant::now();
        assert_eq!(reveal_wait(ReadyOutcome::TimedOut, now, now), Duration::ZERO);
    }
}
