//! # Serial Communication Module
//!
//! Handles the serial link to the centrifuge controller.
//!
//! This module handles:
//! - Opening the configured port (8N1, no flow control)
//! - Writing encoded commands
//! - Reading whatever telemetry bytes are available into a line buffer
//!
//! The link is opened once and never reconnected; a closed or failing port is
//! reported as an error for the caller to treat as fatal.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, warn};

use crate::config::SerialConfig;
use crate::error::{CentrifugeError, Result};
use crate::protocol::command::Command;
use crate::protocol::telemetry::LineBuffer;

/// Serial link to the centrifuge controller
///
/// Generic over the transport so tests can substitute an in-memory stream.
pub struct CentrifugeSerial<P = SerialStream> {
    /// Port handle
    port: P,
    /// Device path (e.g., /dev/ttyACM0)
    device_path: String,
}

impl<P> std::fmt::Debug for CentrifugeSerial<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CentrifugeSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl CentrifugeSerial<SerialStream> {
    /// Open the controller port described by `config`
    ///
    /// # Errors
    ///
    /// Returns a `Serial` error if the port is missing, busy or misconfigured.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use centrifuge_panel::config::SerialConfig;
    /// use centrifuge_panel::serial::CentrifugeSerial;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let serial = CentrifugeSerial::open(&SerialConfig::default())?;
    ///     println!("Connected to: {}", serial.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(config: &SerialConfig) -> Result<Self> {
        debug!("Opening serial port {} at {} baud", config.port, config.baud_rate);

        let port = Self::open_port(config).map_err(|e| {
            warn!("Failed to open {}: {}", config.port, e);
            e
        })?;

        info!("Opened centrifuge controller at {} ({} baud)", config.port, config.baud_rate);
        Ok(Self::from_port(port, config.port.clone()))
    }

    fn open_port(config: &SerialConfig) -> Result<SerialStream> {
        tokio_serial::new(&config.port, config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open_native_async()
            .map_err(|e| CentrifugeError::Serial(format!("Failed to open {}: {}", config.port, e)))
    }
}

impl<P> CentrifugeSerial<P>
where
    P: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already-open transport
    pub fn from_port(port: P, device_path: impl Into<String>) -> Self {
        Self {
            port,
            device_path: device_path.into(),
        }
    }

    /// Write one command and flush it to the controller
    ///
    /// # Errors
    ///
    /// Returns a `Serial` error if the write or flush fails.
    pub async fn send_command(&mut self, command: &Command) -> Result<()> {
        let line = command.encode();

        self.port
            .write_all(&line)
            .await
            .map_err(|e| CentrifugeError::Serial(format!("Failed to write {}: {}", command, e)))?;

        self.port
            .flush()
            .await
            .map_err(|e| CentrifugeError::Serial(format!("Failed to flush serial port: {}", e)))?;

        debug!("Sent {}", command);
        Ok(())
    }

    /// Send several commands in order
    pub async fn send_all(&mut self, commands: &[Command]) -> Result<()> {
        for command in commands {
            self.send_command(command).await?;
        }
        Ok(())
    }

    /// Wait for telemetry bytes and append them to `buffer`
    ///
    /// Cancel safe: if dropped inside `tokio::select!` before completing, no
    /// bytes have been consumed.
    ///
    /// # Errors
    ///
    /// Returns `LinkClosed` on end of stream and `Serial` on a read failure.
    pub async fn read_available(&mut self, buffer: &mut LineBuffer) -> Result<usize> {
        let read = self
            .port
            .read_buf(buffer.bytes_mut())
            .await
            .map_err(|e| CentrifugeError::Serial(format!("Failed to read serial port: {}", e)))?;

        if read == 0 {
            return Err(CentrifugeError::LinkClosed);
        }

        buffer.discard_overlong();
        Ok(read)
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}
