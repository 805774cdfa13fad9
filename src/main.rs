//! Setu - headless runner
//!
//! Seeds the world from the config file, connects to the controller (serial
//! board or the built-in emulator) and cycles until Ctrl-C or until the link
//! closes.

use setu::config::{AppConfig, DeviceKind};
use setu::devices::create_transport;
use setu::error::{Error, Result};
use setu::protocol::{CycleOutcome, LinkState, LinkTiming};
use setu::render::{elapsed_line, legend, render_world};
use setu::session::{SensorWatch, Session};
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

struct Args {
    config_path: Option<String>,
    emulate: bool,
}

/// Supports:
/// - `setu <path>` (positional)
/// - `setu --config <path>` / `setu -c <path>`
/// - `--emulate` to use the built-in controller emulator
fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let emulate = args.iter().skip(1).any(|a| a == "--emulate");

    let mut config_path = None;
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            config_path = Some(args[i + 1].clone());
            break;
        }
    }
    if config_path.is_none() {
        config_path = args
            .iter()
            .skip(1)
            .find(|a| !a.starts_with('-'))
            .cloned();
    }

    Args {
        config_path,
        emulate,
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    let mut config = match &args.config_path {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if args.emulate {
        config.device.kind = DeviceKind::Emulated;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("Setu v{} starting...", env!("CARGO_PKG_VERSION"));
    match &args.config_path {
        Some(path) => log::info!("Using config: {}", path),
        None => log::info!("No config given, using defaults"),
    }

    let world = config.build_world()?;
    let mut session = Session::with_world(world, LinkTiming::from(&config.protocol));

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    match config.device.kind {
        DeviceKind::Serial => log::info!(
            "Controller: {} @ {} baud",
            config.serial.port,
            config.serial.baud_rate
        ),
        DeviceKind::Emulated => log::info!("Controller: emulated"),
    }
    session.start_with(create_transport(&config))?;
    log::debug!("Legend:\n{}", legend());

    let cycle_interval = Duration::from_millis(config.protocol.cycle_interval_ms);
    let mut watch = SensorWatch::new();

    while running.load(Ordering::Relaxed) {
        if let Some(outcome) = session.tick() {
            match &outcome {
                CycleOutcome::Skipped => log::trace!("No robot placed, cycle skipped"),
                CycleOutcome::Command { command, applied } => {
                    log::info!("{:?} -> {:?}", command, applied);
                    log::debug!("\n{}", render_world(session.world()));
                }
                other => log::info!("Cycle: {:?}", other),
            }
        }

        if let Some(frame) = session.sensors().and_then(|f| watch.observe(f)) {
            log::debug!("Sensors: {:?}", frame);
        }

        if session.link_state() == LinkState::Closed {
            break;
        }
        thread::sleep(cycle_interval);
    }

    log::info!("Shutting down...");
    let failure = session.link_error().map(str::to_string);
    session.stop_session()?;
    if let Some(elapsed) = session.elapsed() {
        log::info!("{}", elapsed_line(elapsed));
    }
    log::info!("Final grid:\n{}", render_world(session.world()));

    match failure {
        Some(reason) => Err(Error::TransportClosed(reason)),
        None => {
            log::info!("Setu stopped");
            Ok(())
        }
    }
}
