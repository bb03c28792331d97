use crate::tracking::domain::command::Command;
use crate::tracking::domain::tracking_config::{RoundingMode, TrackingConfig};

/// Turns a horizontal pixel error into a bounded steering step.
///
/// Errors inside the dead-band produce nothing, which keeps detector
/// jitter around the center from chattering the actuator. Outside it the
/// error is scaled, rounded and clamped to `[-max_cmd, max_cmd]`.
#[derive(Clone, Debug)]
pub struct CommandMapper {
    deadband: u32,
    max_cmd: i32,
    scale: f64,
    rounding: RoundingMode,
}

impl CommandMapper {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            deadband: config.deadband.max(0) as u32,
            max_cmd: config.max_cmd,
            scale: config.scale,
            rounding: config.rounding,
        }
    }

    /// `center_x - target_cx`: positive when the face sits left of center.
    pub fn offset(center_x: i32, target_cx: i32) -> i32 {
        center_x.saturating_sub(target_cx)
    }

    pub fn within_deadband(&self, err: i32) -> bool {
        err.unsigned_abs() <= self.deadband
    }

    /// Maps an error to a steering command, or `None` when no step is due.
    ///
    /// A step that rounds to zero is also dropped so every emitted command
    /// points the same way as the error.
    pub fn map(&self, err: i32) -> Option<Command> {
        if self.within_deadband(err) {
            return None;
        }
        let max = self.max_cmd as f64;
        let step = self
            .rounding
            .apply(self.scale * err as f64)
            .clamp(-max, max) as i32;
        if step == 0 {
            return None;
        }
        Some(Command::Steer(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn mapper(rounding: RoundingMode) -> CommandMapper {
        CommandMapper::new(&TrackingConfig {
            rounding,
            ..TrackingConfig::default()
        })
    }

    #[test]
    fn test_offset_sign() {
        assert_eq!(CommandMapper::offset(160, 100), 60);
        assert_eq!(CommandMapper::offset(160, 220), -60);
        assert_eq!(CommandMapper::offset(160, i32::MIN), i32::MAX);
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    #[case(-5)]
    #[case(12)]
    #[case(-12)]
    fn test_deadband_emits_nothing(#[case] err: i32) {
        assert_eq!(mapper(RoundingMode::Nearest).map(err), None);
        assert_eq!(mapper(RoundingMode::Truncate).map(err), None);
    }

    #[test]
    fn test_just_outside_deadband_steers() {
        // 13 * 0.08 = 1.04
        assert_eq!(mapper(RoundingMode::Nearest).map(13), Some(Command::Steer(1)));
        assert_eq!(mapper(RoundingMode::Nearest).map(-13), Some(Command::Steer(-1)));
    }

    #[test]
    fn test_fractional_step_nearest_vs_truncate() {
        // 60 * 0.08 = 4.8
        assert_eq!(mapper(RoundingMode::Nearest).map(60), Some(Command::Steer(5)));
        assert_eq!(mapper(RoundingMode::Truncate).map(60), Some(Command::Steer(4)));
        assert_eq!(mapper(RoundingMode::Nearest).map(-60), Some(Command::Steer(-5)));
        assert_eq!(mapper(RoundingMode::Truncate).map(-60), Some(Command::Steer(-4)));
    }

    #[test]
    fn test_in_range_step_is_not_clamped() {
        // 150 * 0.08 = 12
        assert_eq!(mapper(RoundingMode::Nearest).map(150), Some(Command::Steer(12)));
    }

    #[rstest]
    #[case(660, 20)]
    #[case(-660, -20)]
    #[case(i32::MAX, 20)]
    #[case(i32::MIN + 1, -20)]
    fn test_large_errors_clamp(#[case] err: i32, #[case] expected: i32) {
        assert_eq!(
            mapper(RoundingMode::Nearest).map(err),
            Some(Command::Steer(expected))
        );
    }

    #[test]
    fn test_zero_step_is_dropped() {
        let m = CommandMapper::new(&TrackingConfig {
            scale: 0.05,
            rounding: RoundingMode::Truncate,
            ..TrackingConfig::default()
        });
        // 13 * 0.05 = 0.65 truncates to 0
        assert_eq!(m.map(13), None);
    }

    #[test]
    fn test_every_emitted_step_is_bounded_and_signed() {
        for rounding in [RoundingMode::Nearest, RoundingMode::Truncate] {
            let m = mapper(rounding);
            for err in -2000..=2000 {
                match m.map(err) {
                    None => assert!(err.abs() <= 12 || (0.08 * err as f64).abs() < 1.0),
                    Some(Command::Steer(step)) => {
                        assert!((-20..=20).contains(&step), "err {err} gave {step}");
                        assert_eq!(step.signum(), err.signum(), "err {err} gave {step}");
                        assert!(err.abs() > 12);
                    }
                    Some(other) => panic!("unexpected command {other:?}"),
                }
            }
        }
    }
}
