//! Controller devices the link can talk to

pub mod emulator;

use crate::config::{AppConfig, DeviceKind};
use crate::transport::{SerialTransport, Transport, TransportFactory};
pub use emulator::ControllerEmulator;

/// Transport factory for the configured device
pub fn create_transport(config: &AppConfig) -> TransportFactory {
    match config.device.kind {
        DeviceKind::Serial => {
            serial_factory(config.serial.port.clone(), config.serial.baud_rate)
        }
        DeviceKind::Emulated => {
            let seed = config.device.seed;
            Box::new(move || {
                log::info!("Using emulated controller (seed {})", seed);
                Ok(Box::new(ControllerEmulator::new(seed)) as Box<dyn Transport>)
            })
        }
    }
}

/// Factory opening a serial port on the link worker
pub fn serial_factory(port: String, baud_rate: u32) -> TransportFactory {
    Box::new(move || {
        let transport = SerialTransport::open(&port, baud_rate)?;
        Ok(Box::new(transport) as Box<dyn Transport>)
    })
}
