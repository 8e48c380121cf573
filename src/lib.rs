//! # Centrifuge Panel Library
//!
//! Control a motor-driven centrifuge over a serial link.
//!
//! This library provides the line protocol spoken by the centrifuge
//! controller (commands out, `<rpm>,<pwm>` telemetry in) and the panel state
//! that turns operator input into commands and telemetry into readouts and a
//! rolling RPM history.

pub mod config;
pub mod console;
pub mod error;
pub mod panel;
pub mod protocol;
pub mod serial;
pub mod session;
