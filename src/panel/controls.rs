//! # Motor Controls
//!
//! Turns the operator's fields and buttons into controller commands and
//! tracks timed stops.
//!
//! A "go" with a duration arms a stop deadline. Deadlines are checked
//! against the monotonic clock on every update tick and are never cancelled:
//! a manual stop sends its own `STOP` and leaves armed deadlines in place.
//! `STOP` is idempotent on the controller, so a second one is harmless.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::Result;
use crate::protocol::command::{plan_start, Command, StartPlan};

/// Operator input fields plus armed stop deadlines
#[derive(Debug, Default)]
pub struct MotorControls {
    target_field: String,
    duration_field: String,
    stop_deadlines: Vec<Instant>,
}

impl MotorControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_target(&mut self, text: impl Into<String>) {
        self.target_field = text.into();
    }

    pub fn set_duration(&mut self, text: impl Into<String>) {
        self.duration_field = text.into();
    }

    pub fn target(&self) -> &str {
        &self.target_field
    }

    pub fn duration(&self) -> &str {
        &self.duration_field
    }

    /// Plan the commands for the "go" button from the current fields
    ///
    /// The caller sends `plan.commands` and then arms the stop with
    /// [`MotorControls::arm_stop`], so the delay counts from the moment
    /// `START` actually went out.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDuration` if the duration field is not a whole number
    /// of seconds, `DurationTooLong` if it is longer than a week.
    pub fn go(&self) -> Result<StartPlan> {
        plan_start(Some(self.target_field.as_str()), Some(self.duration_field.as_str()))
    }

    /// Arm a stop due `delay` after `start_sent_at`
    pub fn arm_stop(&mut self, start_sent_at: Instant, delay: Duration) {
        // An unrepresentable deadline stops at the next tick
        let deadline = start_sent_at.checked_add(delay).unwrap_or(start_sent_at);
        self.stop_deadlines.push(deadline);
    }

    /// Command for the "stop" button; armed deadlines stay armed
    pub fn stop(&self) -> Command {
        Command::Stop
    }

    /// Remove deadlines that have passed and return one `STOP` for each
    pub fn due_stops(&mut self, now: Instant) -> Vec<Command> {
        let before = self.stop_deadlines.len();
        self.stop_deadlines.retain(|&deadline| deadline > now);
        vec![Command::Stop; before - self.stop_deadlines.len()]
    }

    /// Number of armed stop deadlines
    pub fn pending_stops(&self) -> usize {
        self.stop_deadlines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CentrifugeError;

    #[test]
    fn test_go_with_target_and_duration() {
        let mut controls = MotorControls::new();
        controls.set_target("1500");
        controls.set_duration("10");

        let plan = controls.go().unwrap();
        assert_eq!(
            plan.commands,
            vec![Command::Set("1500".to_string()), Command::Start]
        );
        assert_eq!(plan.stop_after, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_go_with_empty_fields_sends_start_only() {
        let controls = MotorControls::new();
        let plan = controls.go().unwrap();
        assert_eq!(plan.commands, vec![Command::Start]);
        assert_eq!(plan.stop_after, None);
    }

    #[test]
    fn test_go_with_bad_duration_fails() {
        let mut controls = MotorControls::new();
        controls.set_duration("soon");
        assert!(matches!(
            controls.go(),
            Err(CentrifugeError::InvalidDuration { .. })
        ));
        assert_eq!(controls.pending_stops(), 0);
    }

    #[test]
    fn test_scheduled_stop_fires_no_earlier_than_duration() {
        let mut controls = MotorControls::new();
        let sent_at = Instant::now();
        controls.arm_stop(sent_at, Duration::from_secs(10));

        assert!(controls.due_stops(sent_at).is_empty());
        assert!(controls.due_stops(sent_at + Duration::from_millis(9_999)).is_empty());
        assert_eq!(
            controls.due_stops(sent_at + Duration::from_secs(10)),
            vec![Command::Stop]
        );
        // Fires once only
        assert!(controls.due_stops(sent_at + Duration::from_secs(20)).is_empty());
        assert_eq!(controls.pending_stops(), 0);
    }

    #[test]
    fn test_manual_stop_does_not_cancel_scheduled_stop() {
        let mut controls = MotorControls::new();
        let sent_at = Instant::now();
        controls.arm_stop(sent_at, Duration::from_secs(5));

        assert_eq!(controls.stop(), Command::Stop);
        assert_eq!(controls.pending_stops(), 1);
        assert_eq!(
            controls.due_stops(sent_at + Duration::from_secs(5)),
            vec![Command::Stop]
        );
    }

    #[test]
    fn test_each_go_arms_its_own_stop() {
        let mut controls = MotorControls::new();
        let first = Instant::now();
        controls.arm_stop(first, Duration::from_secs(3));
        controls.arm_stop(first + Duration::from_secs(1), Duration::from_secs(3));

        assert_eq!(controls.due_stops(first + Duration::from_secs(3)).len(), 1);
        assert_eq!(controls.due_stops(first + Duration::from_secs(4)).len(), 1);
        assert_eq!(controls.pending_stops(), 0);
    }

    #[test]
    fn test_go_with_huge_duration_fails_before_planning() {
        let mut controls = MotorControls::new();
        controls.set_target("1500");
        controls.set_duration("18446744073709551615");
        assert!(matches!(
            controls.go(),
            Err(CentrifugeError::DurationTooLong { .. })
        ));
        assert_eq!(controls.pending_stops(), 0);
    }

    #[test]
    fn test_arm_stop_with_overflowing_delay_does_not_panic() {
        let mut controls = MotorControls::new();
        let sent_at = Instant::now();
        controls.arm_stop(sent_at, Duration::MAX);

        assert_eq!(controls.due_stops(sent_at), vec![Command::Stop]);
    }

    #[test]
    fn test_fields_are_kept() {
        let mut controls = MotorControls::new();
        controls.set_target("900");
        controls.set_duration("30");
        assert_eq!(controls.target(), "900");
        assert_eq!(controls.duration(), "30");
    }
}
