//! # Telemetry Decoder
//!
//! Splits the controller's byte stream into lines and parses each line as a
//! `<rpm>,<pwm>` reading.
//!
//! ## Line Format
//!
//! ```text
//! 1452.3,187\n     rpm = 1452.3 (float), pwm = 187 (integer)
//! ```
//!
//! Arduino `println` terminates lines with `\r\n`; surrounding whitespace is
//! ignored.

use std::num::{ParseFloatError, ParseIntError};

use bytes::{Buf, BytesMut};
use thiserror::Error;

/// Separator between the RPM and PWM fields
pub const FIELD_SEPARATOR: char = ',';

/// Longest partial line kept while waiting for its terminator
pub const MAX_LINE_LENGTH: usize = 256;

/// One parsed telemetry line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReading {
    /// Motor speed reported by the controller
    pub rpm: f64,
    /// Drive level reported by the controller
    pub pwm: i32,
}

/// Reasons a telemetry line is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TelemetryParseError {
    #[error("line is not valid UTF-8")]
    NotUtf8,

    #[error("line is empty")]
    Empty,

    #[error("expected 2 comma-separated fields, got {0}")]
    FieldCount(usize),

    #[error("invalid RPM field: {0}")]
    InvalidRpm(#[from] ParseFloatError),

    #[error("invalid PWM field: {0}")]
    InvalidPwm(#[from] ParseIntError),
}

/// Parse one telemetry line
///
/// # Errors
///
/// Returns a [`TelemetryParseError`] if the line does not hold exactly two
/// comma-separated fields, or if either field is not a number of the
/// expected type.
///
/// # Examples
///
/// ```
/// use centrifuge_panel::protocol::telemetry::parse_line;
///
/// let reading = parse_line("1452.3,187\r\n")?;
/// assert_eq!(reading.rpm, 1452.3);
/// assert_eq!(reading.pwm, 187);
/// # Ok::<(), centrifuge_panel::protocol::telemetry::TelemetryParseError>(())
/// ```
pub fn parse_line(line: &str) -> Result<TelemetryReading, TelemetryParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(TelemetryParseError::Empty);
    }

    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let [rpm, pwm] = fields.as_slice() else {
        return Err(TelemetryParseError::FieldCount(fields.len()));
    };

    Ok(TelemetryReading {
        rpm: rpm.trim().parse()?,
        pwm: pwm.trim().parse()?,
    })
}

/// Parse one raw line as received from the link
pub fn parse_line_bytes(line: &[u8]) -> Result<TelemetryReading, TelemetryParseError> {
    let text = std::str::from_utf8(line).map_err(|_| TelemetryParseError::NotUtf8)?;
    parse_line(text)
}

/// Accumulates raw serial bytes and yields complete lines
///
/// Bytes after the last `\n` stay buffered until the rest of the line
/// arrives. A partial line that grows past [`MAX_LINE_LENGTH`] is dropped
/// together with everything up to its terminating `\n`, even when that
/// arrives in a later read.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: BytesMut,
    /// Offset where the remainder of a cut overlong line starts
    discard_from: Option<usize>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(MAX_LINE_LENGTH),
            discard_from: None,
        }
    }

    /// Append raw bytes
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.discard_overlong();
    }

    /// Mutable access for direct reads from the serial port
    ///
    /// Call [`LineBuffer::discard_overlong`] after filling.
    pub fn bytes_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Remove and return the next complete line, without its terminator
    pub fn next_line(&mut self) -> Option<BytesMut> {
        let end = self.buf.iter().position(|&b| b == b'\n')?;
        let mut line = self.buf.split_to(end + 1);
        if let Some(from) = self.discard_from.as_mut() {
            *from -= end + 1;
        }
        line.truncate(end);
        Some(line)
    }

    /// Drop a partial line that exceeds the length limit, and the rest of a
    /// previously cut line up to its terminator
    pub fn discard_overlong(&mut self) {
        if let Some(from) = self.discard_from {
            match self.buf[from..].iter().position(|&b| b == b'\n') {
                Some(end) => {
                    let mut rest = self.buf.split_off(from);
                    rest.advance(end + 1);
                    self.buf.unsplit(rest);
                    self.discard_from = None;
                }
                None => {
                    self.buf.truncate(from);
                    return;
                }
            }
        }

        let tail_start = self
            .buf
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);

        if self.buf.len() - tail_start > MAX_LINE_LENGTH {
            self.buf.truncate(tail_start);
            self.discard_from = Some(tail_start);
        }
    }

    /// Number of buffered bytes not yet returned as lines
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
