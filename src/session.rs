//! # Panel Session
//!
//! Binds the serial link, the line buffer and the panel state together.
//! Every entry point (update tick, serial data, operator action) is a
//! method here and runs on the single update-loop task.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::console::UserAction;
use crate::error::Result;
use crate::panel::PanelState;
use crate::protocol::telemetry::LineBuffer;
use crate::serial::CentrifugeSerial;

/// Whether the update loop should keep running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One connected panel
#[derive(Debug)]
pub struct PanelSession<P> {
    serial: CentrifugeSerial<P>,
    lines: LineBuffer,
    panel: PanelState,
}

impl<P> PanelSession<P>
where
    P: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(serial: CentrifugeSerial<P>, panel: PanelState) -> Self {
        Self {
            serial,
            lines: LineBuffer::new(),
            panel,
        }
    }

    /// Wait for telemetry bytes from the controller
    ///
    /// Cancel safe, for use as a `tokio::select!` branch.
    pub async fn read_serial(&mut self) -> Result<usize> {
        self.serial.read_available(&mut self.lines).await
    }

    /// Periodic update: drain complete lines and send any due timed stops
    ///
    /// Lines are stamped as they are drained; `now` decides which stops are
    /// due. Returns the number of samples added.
    pub async fn tick(&mut self, now: Instant) -> Result<usize> {
        let added = self.panel.drain_lines(&mut self.lines);

        let due = self.panel.controls_mut().due_stops(now);
        if !due.is_empty() {
            info!("Run duration elapsed, stopping motor");
            self.serial.send_all(&due).await?;
        }

        Ok(added)
    }

    /// Apply one operator action
    ///
    /// # Errors
    ///
    /// Propagates a malformed duration on `Go` and any serial write failure.
    pub async fn handle_action(&mut self, action: UserAction) -> Result<Flow> {
        match action {
            UserAction::SetTarget(text) => {
                debug!("Target field set to {:?}", text);
                self.panel.controls_mut().set_target(text);
            }
            UserAction::SetDuration(text) => {
                debug!("Duration field set to {:?}", text);
                self.panel.controls_mut().set_duration(text);
            }
            UserAction::Go => self.go().await?,
            UserAction::Stop => {
                let stop = self.panel.controls().stop();
                self.serial.send_command(&stop).await?;
                info!("Motor stop requested");
            }
            UserAction::Status => {
                info!(
                    "{} | {} samples | {} timed stop(s) pending",
                    self.panel.readouts(),
                    self.panel.history().len(),
                    self.panel.controls().pending_stops()
                );
            }
            UserAction::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    async fn go(&mut self) -> Result<()> {
        let plan = self.panel.controls().go()?;
        self.serial.send_all(&plan.commands).await?;

        match plan.stop_after {
            Some(delay) => {
                self.panel.controls_mut().arm_stop(Instant::now(), delay);
                info!("Motor started, stopping in {}s", delay.as_secs());
            }
            None => info!("Motor started"),
        }

        Ok(())
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn device_path(&self) -> &str {
        self.serial.device_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CentrifugeError;
    use crate::panel::clock::SessionClock;
    use std::time::Duration;
    use tokio_test::io::{Builder, Mock};

    fn session(mock: Mock) -> PanelSession<Mock> {
        let panel = PanelState::with_clock(SessionClock::start(), 500);
        PanelSession::new(CentrifugeSerial::from_port(mock, "mock"), panel)
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_with_target_and_duration_stops_later() {
        let mock = Builder::new()
            .write(b"SET:1500\n")
            .write(b"START\n")
            .write(b"STOP\n")
            .build();
        let mut session = session(mock);

        session.handle_action(UserAction::SetTarget("1500".into())).await.unwrap();
        session.handle_action(UserAction::SetDuration("3".into())).await.unwrap();
        session.handle_action(UserAction::Go).await.unwrap();

        tokio::time::advance(Duration::from_millis(2_950)).await;
        session.tick(Instant::now()).await.unwrap();
        assert_eq!(session.panel().controls().pending_stops(), 1);

        tokio::time::advance(Duration::from_millis(50)).await;
        session.tick(Instant::now()).await.unwrap();
        assert_eq!(session.panel().controls().pending_stops(), 0);
    }

    #[tokio::test]
    async fn test_go_without_target_sends_start_only() {
        let mock = Builder::new().write(b"START\n").build();
        let mut session = session(mock);

        let flow = session.handle_action(UserAction::Go).await.unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(session.panel().controls().pending_stops(), 0);
    }

    #[tokio::test]
    async fn test_go_with_bad_duration_sends_nothing() {
        let mock = Builder::new().build();
        let mut session = session(mock);

        session.handle_action(UserAction::SetTarget("1500".into())).await.unwrap();
        session.handle_action(UserAction::SetDuration("abc".into())).await.unwrap();

        assert!(matches!(
            session.handle_action(UserAction::Go).await,
            Err(CentrifugeError::InvalidDuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_go_with_overlong_duration_sends_nothing() {
        let mock = Builder::new().build();
        let mut session = session(mock);

        session.handle_action(UserAction::SetTarget("1500".into())).await.unwrap();
        session
            .handle_action(UserAction::SetDuration("18446744073709551615".into()))
            .await
            .unwrap();

        assert!(matches!(
            session.handle_action(UserAction::Go).await,
            Err(CentrifugeError::DurationTooLong { .. })
        ));
        assert_eq!(session.panel().controls().pending_stops(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_stop_and_scheduled_stop_both_fire() {
        let mock = Builder::new()
            .write(b"START\n")
            .write(b"STOP\n")
            .write(b"STOP\n")
            .build();
        let mut session = session(mock);

        session.handle_action(UserAction::SetDuration("1".into())).await.unwrap();
        session.handle_action(UserAction::Go).await.unwrap();
        session.handle_action(UserAction::Stop).await.unwrap();

        tokio::time::advance(Duration::from_secs(1)).await;
        session.tick(Instant::now()).await.unwrap();
    }

    #[tokio::test]
    async fn test_manual_stop_sends_one_stop() {
        let mock = Builder::new().write(b"STOP\n").build();
        let mut session = session(mock);
        session.handle_action(UserAction::Stop).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_serial_telemetry_reaches_history() {
        let mock = Builder::new()
            .read(b"1000.0,100\r\nbad_line\r\n")
            .read(b"1050.5,105\r\n")
            .build();
        let mut session = session(mock);

        session.read_serial().await.unwrap();
        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(session.tick(Instant::now()).await.unwrap(), 1);

        session.read_serial().await.unwrap();
        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(session.tick(Instant::now()).await.unwrap(), 1);

        let samples: Vec<_> = session.panel().history().iter().copied().collect();
        assert_eq!(samples.len(), 2);
        assert_eq!((samples[0].rpm, samples[0].pwm), (1000.0, 100));
        assert_eq!((samples[1].rpm, samples[1].pwm), (1050.5, 105));
        assert!(samples[1].elapsed_secs > samples[0].elapsed_secs);
        assert_eq!(
            session.panel().readouts().to_string(),
            "Current RPM: 1050.5 | Current PWM: 105"
        );
    }

    #[tokio::test]
    async fn test_quit_and_status() {
        let mut session = session(Builder::new().build());
        assert_eq!(
            session.handle_action(UserAction::Status).await.unwrap(),
            Flow::Continue
        );
        assert_eq!(
            session.handle_action(UserAction::Quit).await.unwrap(),
            Flow::Quit
        );
    }
}
