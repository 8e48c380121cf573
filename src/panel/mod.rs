//! # Panel State
//!
//! Everything the control panel shows and remembers, owned by the update
//! loop: the session clock, the rolling RPM history, the two readouts and
//! the motor controls.
//!
//! This module handles:
//! - Draining complete telemetry lines into the history
//! - Discarding malformed lines without touching any state
//! - Formatting the RPM/PWM readouts

pub mod clock;
pub mod controls;
pub mod history;

use std::fmt;

use tokio::time::Instant;
use tracing::trace;

use crate::config::PanelConfig;
use crate::protocol::telemetry::{parse_line_bytes, LineBuffer, TelemetryParseError, TelemetryReading};
use clock::SessionClock;
use controls::MotorControls;
use history::{RollingHistory, TelemetrySample};

/// Latest RPM and PWM values as shown to the operator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Readouts {
    latest: Option<TelemetryReading>,
}

impl Readouts {
    pub fn latest(&self) -> Option<TelemetryReading> {
        self.latest
    }

    /// RPM readout, one decimal place once a sample has arrived
    pub fn rpm_label(&self) -> String {
        match self.latest {
            Some(reading) => format!("Current RPM: {:.1}", reading.rpm),
            None => "Current RPM: 0".to_string(),
        }
    }

    pub fn pwm_label(&self) -> String {
        format!("Current PWM: {}", self.latest.map_or(0, |reading| reading.pwm))
    }
}

impl fmt::Display for Readouts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.rpm_label(), self.pwm_label())
    }
}

/// Application state driven by the update loop
#[derive(Debug)]
pub struct PanelState {
    clock: SessionClock,
    history: RollingHistory,
    readouts: Readouts,
    controls: MotorControls,
}

impl PanelState {
    /// Create panel state with a session starting now
    pub fn new(config: &PanelConfig) -> Self {
        Self::with_clock(SessionClock::start(), config.history_capacity)
    }

    pub fn with_clock(clock: SessionClock, history_capacity: usize) -> Self {
        Self {
            clock,
            history: RollingHistory::with_capacity(history_capacity),
            readouts: Readouts::default(),
            controls: MotorControls::new(),
        }
    }

    /// Parse one raw line and record it as a sample taken at `now`
    ///
    /// # Errors
    ///
    /// Returns the parse error for a malformed line; state is left untouched.
    pub fn ingest_line(
        &mut self,
        line: &[u8],
        now: Instant,
    ) -> Result<TelemetrySample, TelemetryParseError> {
        let reading = parse_line_bytes(line)?;
        Ok(self.record(reading, now))
    }

    /// Drain every complete line from `buffer`, returning how many samples were added
    ///
    /// Each line is stamped with the instant it is processed. Malformed lines
    /// are dropped silently.
    pub fn drain_lines(&mut self, buffer: &mut LineBuffer) -> usize {
        self.drain_lines_with(buffer, Instant::now)
    }

    /// Like [`PanelState::drain_lines`], reading each line's instant from `clock`
    pub fn drain_lines_with<F>(&mut self, buffer: &mut LineBuffer, mut clock: F) -> usize
    where
        F: FnMut() -> Instant,
    {
        let mut added = 0;
        while let Some(line) = buffer.next_line() {
            match self.ingest_line(&line, clock()) {
                Ok(_) => added += 1,
                Err(e) => trace!("Discarded telemetry line {:?}: {}", String::from_utf8_lossy(&line), e),
            }
        }
        added
    }

    fn record(&mut self, reading: TelemetryReading, now: Instant) -> TelemetrySample {
        // Keep the series non-decreasing even if a caller passes a stale instant
        let floor = self.history.latest().map_or(0.0, |s| s.elapsed_secs);
        let sample = TelemetrySample {
            elapsed_secs: self.clock.elapsed_at(now).max(floor),
            rpm: reading.rpm,
            pwm: reading.pwm,
        };

        self.history.push(sample);
        self.readouts.latest = Some(reading);
        sample
    }

    pub fn history(&self) -> &RollingHistory {
        &self.history
    }

    pub fn readouts(&self) -> &Readouts {
        &self.readouts
    }

    pub fn controls(&self) -> &MotorControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut MotorControls {
        &mut self.controls
    }
}
