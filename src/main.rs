//! # Centrifuge Panel
//!
//! Control a motor-driven centrifuge from the terminal.
//!
//! Sends target RPM and run duration to the controller over serial and logs
//! the RPM/PWM telemetry it streams back.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, sleep, Duration, Instant, MissedTickBehavior};
use tracing::{info, warn};

use centrifuge_panel::config::Config;
use centrifuge_panel::console::parse_action;
use centrifuge_panel::panel::PanelState;
use centrifuge_panel::serial::CentrifugeSerial;
use centrifuge_panel::session::{Flow, PanelSession};

/// Interval between status log messages
const STATUS_LOG_INTERVAL: Duration = Duration::from_secs(1);

/// Main entry point for Centrifuge Panel
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first argument, or built-in defaults)
///    - Open the controller port and wait for the board to reset
///
/// 2. **Main Loop** (one task, `tokio::select!`)
///    - Buffer telemetry bytes as they arrive
///    - Every update tick, drain complete lines into the history and send
///      any due timed stop
///    - Apply operator actions read from stdin
///    - Log the readouts once per second
///
/// 3. **Shutdown** on `quit`, stdin EOF or Ctrl+C
///
/// # Errors
///
/// Returns error (and exits) if:
/// - Configuration cannot be loaded
/// - The serial port cannot be opened
/// - The link is lost or a command cannot be written
/// - A `go` is issued with a malformed duration
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO centrifuge_panel: Centrifuge Panel v0.1.0 starting...
/// INFO centrifuge_panel::serial: Opened centrifuge controller at /dev/ttyACM0 (9600 baud)
/// INFO centrifuge_panel: Current RPM: 1452.3 | Current PWM: 187 (500 samples)
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Centrifuge Panel v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading config from {}", path))?,
        None => Config::default(),
    };

    let serial = CentrifugeSerial::open(&config.serial)?;

    // Opening the port resets the board; give the bootloader time to hand over
    if config.serial.reset_delay_ms > 0 {
        info!("Waiting {}ms for controller reset", config.serial.reset_delay_ms);
        sleep(Duration::from_millis(config.serial.reset_delay_ms)).await;
    }

    let panel = PanelState::new(&config.panel);
    let mut session = PanelSession::new(serial, panel);

    let mut update_interval = interval(Duration::from_millis(config.panel.update_interval_ms));
    update_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut console = BufReader::new(tokio::io::stdin()).lines();

    info!("Controller ready on {}", session.device_path());
    info!("Commands: target <rpm>, duration <secs>, go, stop, status, quit");

    let mut last_status = Instant::now();

    // Main update loop
    loop {
        tokio::select! {
            read = session.read_serial() => {
                read?;
            }

            _ = update_interval.tick() => {
                let now = Instant::now();
                session.tick(now).await?;

                if now.duration_since(last_status) >= STATUS_LOG_INTERVAL {
                    let panel = session.panel();
                    if !panel.history().is_empty() {
                        info!("{} ({} samples)", panel.readouts(), panel.history().len());
                    }
                    last_status = now;
                }
            }

            line = console.next_line() => {
                let Some(line) = line? else {
                    info!("Console closed, shutting down...");
                    break;
                };

                match parse_action(&line) {
                    Ok(Some(action)) => {
                        if session.handle_action(action).await? == Flow::Quit {
                            info!("Shutting down...");
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!("{}", e),
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    info!("Samples in history: {}", session.panel().history().len());
    Ok(())
}

