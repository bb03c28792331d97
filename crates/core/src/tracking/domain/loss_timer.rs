use std::time::{Duration, Instant};

use crate::tracking::domain::command::Command;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingState {
    /// A target was seen this tick.
    Tracking,
    /// No target, but the loss timeout has not run out yet.
    LostPending,
    /// No target past the timeout, and `Center` has already gone out.
    CenteredIdle,
}

/// Loss-of-target timer with a one-shot centering latch.
///
/// Emits exactly one `Center` per loss episode: the latch is only cleared
/// by a tick that sees a target again.
#[derive(Clone, Debug)]
pub struct LossTimer {
    loss_timeout: Duration,
    last_seen: Instant,
    centering_sent: bool,
    state: TrackingState,
}

impl LossTimer {
    /// Starts the timer as if a target had last been seen at `now`.
    pub fn new(loss_timeout: Duration, now: Instant) -> Self {
        Self {
            loss_timeout,
            last_seen: now,
            centering_sent: false,
            state: TrackingState::LostPending,
        }
    }

    pub fn target_seen(&mut self, now: Instant) {
        self.last_seen = now;
        self.centering_sent = false;
        self.state = TrackingState::Tracking;
    }

    /// Advances the timer on a tick without a target.
    ///
    /// Returns `Some(Command::Center)` on the first tick past the timeout.
    pub fn target_missing(&mut self, now: Instant) -> Option<Command> {
        if now.saturating_duration_since(self.last_seen) <= self.loss_timeout {
            self.state = TrackingState::LostPending;
            return None;
        }
        self.state = TrackingState::CenteredIdle;
        if self.centering_sent {
            return None;
        }
        self.centering_sent = true;
        Some(Command::Center)
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn centering_sent(&self) -> bool {
        self.centering_sent
    }

    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(1500);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_starts_pending_with_latch_clear() {
        let t0 = Instant::now();
        let timer = LossTimer::new(TIMEOUT, t0);
        assert_eq!(timer.state(), TrackingState::LostPending);
        assert!(!timer.centering_sent());
        assert_eq!(timer.last_seen(), t0);
    }

    #[test]
    fn test_missing_within_timeout_is_pending() {
        let t0 = Instant::now();
        let mut timer = LossTimer::new(TIMEOUT, t0);
        timer.target_seen(t0);
        assert_eq!(timer.target_missing(t0 + ms(500)), None);
        assert_eq!(timer.state(), TrackingState::LostPending);
    }

    #[test]
    fn test_exactly_at_timeout_is_still_pending() {
        let t0 = Instant::now();
        let mut timer = LossTimer::new(TIMEOUT, t0);
        assert_eq!(timer.target_missing(t0 + TIMEOUT), None);
        assert_eq!(timer.state(), TrackingState::LostPending);
    }

    #[test]
    fn test_center_once_after_timeout() {
        let t0 = Instant::now();
        let mut timer = LossTimer::new(TIMEOUT, t0);
        assert_eq!(timer.target_missing(t0 + ms(1501)), Some(Command::Center));
        assert_eq!(timer.state(), TrackingState::CenteredIdle);
        assert!(timer.centering_sent());
        assert_eq!(timer.target_missing(t0 + ms(1600)), None);
        assert_eq!(timer.target_missing(t0 + ms(9000)), None);
        assert_eq!(timer.state(), TrackingState::CenteredIdle);
    }

    #[test]
    fn test_seen_target_rearms_latch() {
        let t0 = Instant::now();
        let mut timer = LossTimer::new(TIMEOUT, t0);
        assert_eq!(timer.target_missing(t0 + ms(2000)), Some(Command::Center));

        timer.target_seen(t0 + ms(2100));
        assert_eq!(timer.state(), TrackingState::Tracking);
        assert!(!timer.centering_sent());

        assert_eq!(timer.target_missing(t0 + ms(3000)), None);
        assert_eq!(timer.target_missing(t0 + ms(3700)), Some(Command::Center));
    }
}
