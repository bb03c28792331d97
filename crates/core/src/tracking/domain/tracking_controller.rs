use crate::shared::region::Region;
use crate::tracking::domain::clock::Clock;
use crate::tracking::domain::command::Command;
use crate::tracking::domain::command_mapper::CommandMapper;
use crate::tracking::domain::loss_timer::{LossTimer, TrackingState};
use crate::tracking::domain::target_selector::select_target;
use crate::tracking::domain::tracking_config::TrackingConfig;

/// What the controller decided for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TickDecision {
    pub target: Option<Region>,
    /// `center_x - target_cx`, present whenever a target was selected.
    pub error: Option<i32>,
    /// At most one command per tick, never `Stop`.
    pub command: Option<Command>,
    pub state: TrackingState,
}

/// Closed-loop policy from detections to actuator commands.
///
/// Owns the only state that survives between ticks (the loss timer);
/// everything else is recomputed from the current frame's detections.
pub struct TrackingController {
    mapper: CommandMapper,
    timer: LossTimer,
    clock: Box<dyn Clock>,
}

impl TrackingController {
    pub fn new(config: &TrackingConfig, clock: Box<dyn Clock>) -> Self {
        let timer = LossTimer::new(config.loss_timeout, clock.now());
        Self {
            mapper: CommandMapper::new(config),
            timer,
            clock,
        }
    }

    pub fn tick(&mut self, regions: &[Region], center_x: i32) -> TickDecision {
        let now = self.clock.now();
        match select_target(regions) {
            Some(target) => {
                let err = CommandMapper::offset(center_x, target.center_x());
                self.timer.target_seen(now);
                TickDecision {
                    target: Some(*target),
                    error: Some(err),
                    command: self.mapper.map(err),
                    state: self.timer.state(),
                }
            }
            None => TickDecision {
                target: None,
                error: None,
                command: self.timer.target_missing(now),
                state: self.timer.state(),
            },
        }
    }

    pub fn state(&self) -> TrackingState {
        self.timer.state()
    }

    pub fn centering_sent(&self) -> bool {
        self.timer.centering_sent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::domain::clock::ManualClock;
    use crate::tracking::domain::command::CommandKind;
    use crate::tracking::domain::tracking_config::RoundingMode;
    use std::time::Duration;

    const CENTER_X: i32 = 160;

    fn controller(rounding: RoundingMode) -> (TrackingController, ManualClock) {
        let clock = ManualClock::new();
        let config = TrackingConfig {
            rounding,
            ..TrackingConfig::default()
        };
        (
            TrackingController::new(&config, Box::new(clock.clone())),
            clock,
        )
    }

    /// A 40px-wide face centered at `cx`.
    fn face_at(cx: i32) -> Region {
        Region::new(cx - 20, 90, 40, 40)
    }

    #[test]
    fn test_centered_face_sends_nothing() {
        let (mut c, _) = controller(RoundingMode::Nearest);
        let d = c.tick(&[Region::new(140, 90, 40, 40)], CENTER_X);
        assert_eq!(d.error, Some(0));
        assert_eq!(d.command, None);
        assert_eq!(d.state, TrackingState::Tracking);
    }

    #[test]
    fn test_face_left_of_center_steers_positive() {
        let (mut c, _) = controller(RoundingMode::Nearest);
        let d = c.tick(&[face_at(100)], CENTER_X);
        assert_eq!(d.error, Some(60));
        assert_eq!(d.command, Some(Command::Steer(5)));
        assert_eq!(d.command.unwrap().to_string(), "X5\n");
    }

    #[test]
    fn test_face_left_of_center_truncating() {
        let (mut c, _) = controller(RoundingMode::Truncate);
        let d = c.tick(&[face_at(100)], CENTER_X);
        assert_eq!(d.command, Some(Command::Steer(4)));
    }

    #[test]
    fn test_far_and_pathological_targets() {
        let (mut c, _) = controller(RoundingMode::Nearest);
        assert_eq!(c.tick(&[face_at(10)], CENTER_X).command, Some(Command::Steer(12)));
        assert_eq!(c.tick(&[face_at(-500)], CENTER_X).command, Some(Command::Steer(20)));
        assert_eq!(c.tick(&[face_at(900)], CENTER_X).command, Some(Command::Steer(-20)));
    }

    #[test]
    fn test_largest_face_drives_error() {
        let (mut c, _) = controller(RoundingMode::Nearest);
        let small = Region::new(0, 0, 20, 20);
        let big = Region::new(200, 50, 60, 60);
        let d = c.tick(&[small, big], CENTER_X);
        assert_eq!(d.target, Some(big));
        assert_eq!(d.error, Some(CENTER_X - 230));
    }

    #[test]
    fn test_lost_for_two_seconds_centers_once() {
        let (mut c, clock) = controller(RoundingMode::Nearest);
        c.tick(&[face_at(100)], CENTER_X);

        let mut centers = 0;
        // 20 ticks of 100ms: 2.0s of simulated time without a face.
        for _ in 0..20 {
            clock.advance(Duration::from_millis(100));
            let d = c.tick(&[], CENTER_X);
            if d.command == Some(Command::Center) {
                centers += 1;
            }
            assert_ne!(d.command.map(|cmd| cmd.kind()), Some(CommandKind::Steer));
        }
        assert_eq!(centers, 1);
        assert_eq!(c.state(), TrackingState::CenteredIdle);
        assert!(c.centering_sent());
    }

    #[test]
    fn test_pending_before_timeout() {
        let (mut c, clock) = controller(RoundingMode::Nearest);
        c.tick(&[face_at(100)], CENTER_X);
        clock.advance(Duration::from_millis(1000));
        let d = c.tick(&[], CENTER_X);
        assert_eq!(d.command, None);
        assert_eq!(d.state, TrackingState::LostPending);
    }

    #[test]
    fn test_centered_face_still_clears_latch() {
        let (mut c, clock) = controller(RoundingMode::Nearest);
        clock.advance(Duration::from_secs(2));
        assert_eq!(c.tick(&[], CENTER_X).command, Some(Command::Center));

        // Face returns inside the dead-band: no steering, but the latch resets.
        let d = c.tick(&[face_at(CENTER_X)], CENTER_X);
        assert_eq!(d.command, None);
        assert!(!c.centering_sent());

        clock.advance(Duration::from_secs(2));
        assert_eq!(c.tick(&[], CENTER_X).command, Some(Command::Center));
    }

    #[test]
    fn test_no_face_at_startup_centers_after_timeout() {
        let (mut c, clock) = controller(RoundingMode::Nearest);
        assert_eq!(c.tick(&[], CENTER_X).command, None);
        clock.advance(Duration::from_millis(1600));
        assert_eq!(c.tick(&[], CENTER_X).command, Some(Command::Center));
    }
}
