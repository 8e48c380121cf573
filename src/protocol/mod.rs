//! # Controller Line Protocol
//!
//! ASCII, newline-terminated protocol spoken by the centrifuge controller.
//!
//! This module handles:
//! - Encoding outbound commands (`SET:<n>`, `START`, `STOP`)
//! - Splitting the inbound byte stream into lines
//! - Parsing `<rpm>,<pwm>` telemetry lines

pub mod command;
pub mod telemetry;
