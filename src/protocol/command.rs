//! # Command Encoder
//!
//! Encodes operator requests into controller commands.
//!
//! ## Wire Format
//!
//! ```text
//! SET:<n>\n    set target RPM (sent verbatim, the controller validates nothing)
//! START\n      begin motor operation
//! STOP\n       halt motor operation
//! ```
//!
//! Commands are fire-and-forget: the controller sends no acknowledgment.

use std::fmt;
use std::time::Duration;

use crate::error::{CentrifugeError, Result};

/// Prefix of the set-target command
pub const SET_PREFIX: &str = "SET:";

/// Start command keyword
pub const START_KEYWORD: &str = "START";

/// Stop command keyword
pub const STOP_KEYWORD: &str = "STOP";

/// Line terminator for every command
pub const LINE_TERMINATOR: u8 = b'\n';

/// Longest accepted run duration (one week)
pub const MAX_RUN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// A single controller command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the target RPM
    Set(String),
    /// Begin motor operation
    Start,
    /// Halt motor operation
    Stop,
}

impl Command {
    /// Encode the command as newline-terminated ASCII bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use centrifuge_panel::protocol::command::Command;
    ///
    /// assert_eq!(Command::Set("1500".into()).encode(), b"SET:1500\n");
    /// assert_eq!(Command::Start.encode(), b"START\n");
    /// ```
    pub fn encode(&self) -> Vec<u8> {
        let mut line = self.to_string().into_bytes();
        line.push(LINE_TERMINATOR);
        line
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Set(target) => write!(f, "{}{}", SET_PREFIX, target),
            Command::Start => f.write_str(START_KEYWORD),
            Command::Stop => f.write_str(STOP_KEYWORD),
        }
    }
}

/// Commands produced by a "go" request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartPlan {
    /// Commands to send immediately, in order
    pub commands: Vec<Command>,
    /// Delay after `START` at which a `STOP` is due, if a duration was given
    pub stop_after: Option<Duration>,
}

/// Build the command sequence for a "go" request
///
/// An absent or empty target sends no `SET`. An absent or empty duration
/// schedules no stop.
///
/// # Arguments
///
/// * `target` - Target RPM text, sent as-is
/// * `duration` - Run duration in whole seconds
///
/// # Errors
///
/// Returns `InvalidDuration` if the duration is not a non-negative integer,
/// and `DurationTooLong` if it exceeds [`MAX_RUN_DURATION_SECS`]. Nothing is
/// planned in either case, so no bytes reach the controller.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use centrifuge_panel::protocol::command::{plan_start, Command};
///
/// let plan = plan_start(Some("1500"), Some("10"))?;
/// assert_eq!(plan.commands, vec![Command::Set("1500".into()), Command::Start]);
/// assert_eq!(plan.stop_after, Some(Duration::from_secs(10)));
/// # Ok::<(), centrifuge_panel::error::CentrifugeError>(())
/// ```
pub fn plan_start(target: Option<&str>, duration: Option<&str>) -> Result<StartPlan> {
    let stop_after = match duration.filter(|d| !d.is_empty()) {
        Some(text) => Some(parse_duration_secs(text)?),
        None => None,
    };

    let mut commands = Vec::with_capacity(2);
    if let Some(target) = target.filter(|t| !t.is_empty()) {
        commands.push(Command::Set(target.to_string()));
    }
    commands.push(Command::Start);

    Ok(StartPlan { commands, stop_after })
}

/// Parse a duration given in whole seconds
fn parse_duration_secs(text: &str) -> Result<Duration> {
    let secs = text
        .trim()
        .parse::<u64>()
        .map_err(|source| CentrifugeError::InvalidDuration {
            input: text.to_string(),
            source,
        })?;

    if secs > MAX_RUN_DURATION_SECS {
        return Err(CentrifugeError::DurationTooLong {
            secs,
            max_secs: MAX_RUN_DURATION_SECS,
        });
    }

    Ok(Duration::from_secs(secs))
}
