use std::time::{Duration, Instant};

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyOutcome {
    Ready,
    TimedOut,
}

/// One-shot loading -> ready signal raised by the client's loaded message and awaited by
/// the splash sequence.
#[derive(Debug)]
pub struct StartupSignal {
    sender: watch::Sender<StartupPhase>,
}

impl Default for StartupSignal {
    fn default() -> Self {
        let (sender, _) = watch::channel(StartupPhase::Loading);
        Self { sender }
    }
}

impl StartupSignal {
    pub fn phase(&self) -> StartupPhase {
        *self.sender.borrow()
    }

    /// Returns true only for the call that performed the transition.
    pub fn mark_ready(&self) -> bool {
        self.sender.send_if_modified(|phase| {
            if *phase == StartupPhase::Ready {
                return false;
            }
            *phase = StartupPhase::Ready;
            true
        })
    }

    pub async fn wait_until_ready(&self, timeout: Duration) -> ReadyOutcome {
        let mut receiver = self.sender.subscribe();
        let wait = receiver.wait_for(|phase| *phase == StartupPhase::Ready);
        let outcome = match tokio::time::timeout(timeout, wait).await {
            Ok(Ok(_)) => ReadyOutcome::Ready,
            Ok(Err(_)) | Err(_) => ReadyOutcome::TimedOut,
        };
        outcome
    }
}

/// Tracks when the main window may be revealed: only once ready has been observed and the
/// transition delay has passed since.
#[derive(Debug, Clone, Copy)]
pub struct RevealSchedule {
    ready_at: Option<Instant>,
    delay: Duration,
}

impl RevealSchedule {
    pub fn new(delay: Duration) -> Self {
        Self {
            ready_at: None,
            delay,
        }
    }

    pub fn mark_ready(&mut self, at: Instant) {
        if self.ready_at.is_none() {
            self.ready_at = Some(at);
        }
    }

    pub fn show_due_at(&self) -> Option<Instant> {
        self.ready_at.map(|ready_at| ready_at + self.delay)
    }

    pub fn should_show(&self, now: Instant) -> bool {
        self.show_due_at().is_some_and(|due| now >= due)
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.show_due_at()
            .map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn reveal_requires_ready_before_delay_counts() {
        let start = Instant::now();
        let mut schedule = RevealSchedule::new(Duration::from_millis(700));
        assert!(!schedule.should_show(start + Duration::from_secs(10)));
        assert_eq!(schedule.remaining(start), None);

        schedule.mark_ready(start);
        assert!(!schedule.should_show(start + Duration::from_millis(699)));
        assert!(schedule.should_show(start + Duration::from_millis(700)));
    }

    #[test]
    fn reveal_keeps_first_ready_instant() {
        let start = Instant::now();
        let mut schedule = RevealSchedule::new(Duration::from_millis(500));
        schedule.mark_ready(start);
        schedule.mark_ready(start + Duration::from_secs(3));
        assert_eq!(schedule.show_due_at(), Some(start + Duration::from_millis(500)));
        assert_eq!(
            schedule.remaining(start + Duration::from_millis(200)),
            Some(Duration::from_millis(300))
        );
    }

    #[test]
    fn mark_ready_transitions_once() {
        let signal = StartupSignal::default();
        assert_eq!(signal.phase(), StartupPhase::Loading);
        assert!(signal.mark_ready());
        assert!(!signal.mark_ready());
        assert_eq!(signal.phase(), StartupPhase::Ready);
    }

    #[tokio::test]
    async fn wait_until_ready_resolves_when_signalled_later() {
        let signal = Arc::new(StartupSignal::default());
        let waiter = {
            let signal = Arc::clone(&signal);
            tokio::spawn(async move { signal.wait_until_ready(Duration::from_secs(5)).await })
        };

        tokio::task::yield_now().await;
        signal.mark_ready();
        assert_eq!(waiter.await.expect("join waiter"), ReadyOutcome::Ready);
    }

    #[tokio::test]
    async fn wait_until_ready_returns_immediately_when_already_ready() {
        let signal = StartupSignal::default();
        signal.mark_ready();
        assert_eq!(
            signal.wait_until_ready(Duration::from_millis(1)).await,
            ReadyOutcome::Ready
        );
    }

    #[tokio::test(start_paused = true)]
    async fn wait_until_ready_times_out_without_signal() {
        let signal = StartupSignal::default();
        assert_eq!(
            signal.wait_until_ready(Duration::from_secs(45)).await,
            ReadyOutcome::TimedOut
        );
    }
}
