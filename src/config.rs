//! Configuration for Setu
//!
//! Loads configuration from a TOML file. Every section and field has a
//! default, so an empty file (or no file) is a valid configuration.

use crate::core::types::{Cell, Heading, Position};
use crate::core::world::World;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial link to the controller board
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SerialConfig {
    /// Device path (`/dev/ttyUSB0`, `COM3`, ...)
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// Request/response timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtocolConfig {
    /// Delay after opening the port; the board resets on open
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Spacing between reply polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Polls before a cycle gives up
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    /// Pause between control ticks
    #[serde(default = "default_cycle_interval_ms")]
    pub cycle_interval_ms: u64,
}

/// Initial world layout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    #[serde(default = "default_dimension")]
    pub width: usize,
    #[serde(default = "default_dimension")]
    pub height: usize,
    /// `[col, row]` cells seeded as unidentified obstacles
    #[serde(default)]
    pub obstacles: Vec<[usize; 2]>,
    #[serde(default)]
    pub robot: Option<RobotPlacement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RobotPlacement {
    pub col: usize,
    pub row: usize,
    #[serde(default)]
    pub heading: Heading,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Real board on the serial port
    #[default]
    Serial,
    /// In-process controller emulator
    Emulated,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub kind: DeviceKind,
    /// Emulator RNG seed (0 = random each run)
    #[serde(default)]
    pub seed: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_poll_interval_ms() -> u64 {
    800
}

fn default_max_poll_attempts() -> u32 {
    10
}

fn default_cycle_interval_ms() -> u64 {
    100
}

fn default_dimension() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            cycle_interval_ms: default_cycle_interval_ms(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_dimension(),
            height: default_dimension(),
            obstacles: Vec::new(),
            robot: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load and validate configuration from a TOML file
    ///
    /// # Example
    /// ```no_run
    /// use setu::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("setu.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Defaults with the in-process emulator instead of a serial port
    pub fn emulated_defaults() -> Self {
        Self {
            device: DeviceConfig {
                kind: DeviceKind::Emulated,
                seed: 0,
            },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        if world.width == 0 || world.height == 0 {
            return Err(Error::Config(format!(
                "grid dimensions must be positive, got {}x{}",
                world.width, world.height
            )));
        }
        if self.protocol.max_poll_attempts == 0 {
            return Err(Error::Config("max_poll_attempts must be at least 1".into()));
        }
        if self.protocol.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be positive".into()));
        }

        let inside = |col: usize, row: usize| col < world.width && row < world.height;
        if let Some(&[col, row]) = world.obstacles.iter().find(|[c, r]| !inside(*c, *r)) {
            return Err(Error::Config(format!(
                "obstacle ({}, {}) is outside the {}x{} grid",
                col, row, world.width, world.height
            )));
        }
        if let Some(robot) = world.robot
            && !inside(robot.col, robot.row)
        {
            return Err(Error::Config(format!(
                "robot ({}, {}) is outside the {}x{} grid",
                robot.col, robot.row, world.width, world.height
            )));
        }
        Ok(())
    }

    /// Build the initial world from the `[world]` section
    pub fn build_world(&self) -> Result<World> {
        let mut world = World::new(self.world.width, self.world.height);
        for &[col, row] in &self.world.obstacles {
            world.set_cell(Position::new(col, row), Cell::ObstacleUnidentified)?;
        }
        if let Some(robot) = self.world.robot {
            world.place_robot(Position::new(robot.col, robot.row))?;
            world.set_heading(robot.heading);
        }
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.protocol.settle_ms, 2000);
        assert_eq!(config.protocol.poll_interval_ms, 800);
        assert_eq!(config.protocol.max_poll_attempts, 10);
        assert_eq!(config.world.width, 10);
        assert_eq!(config.world.height, 10);
        assert_eq!(config.device.kind, DeviceKind::Serial);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.logging.level, "info");
        assert!(config.world.robot.is_none());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[serial]
port = "COM3"

[protocol]
poll_interval_ms = 50

[world]
width = 5
height = 4
obstacles = [[2, 1], [4, 3]]
robot = { col = 2, row = 2, heading = "east" }

[device]
kind = "emulated"
seed = 42

[logging]
level = "debug"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.serial.port, "COM3");
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.protocol.poll_interval_ms, 50);
        assert_eq!(config.protocol.max_poll_attempts, 10);
        assert_eq!(config.world.obstacles, vec![[2, 1], [4, 3]]);
        assert_eq!(
            config.world.robot,
            Some(RobotPlacement {
                col: 2,
                row: 2,
                heading: Heading::East
            })
        );
        assert_eq!(config.device.kind, DeviceKind::Emulated);
        assert_eq!(config.device.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_serialization() {
        let config = AppConfig::emulated_defaults();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[serial]"));
        assert!(toml_string.contains("[protocol]"));
        assert!(toml_string.contains("[world]"));
        assert!(toml_string.contains("kind = \"emulated\""));
        assert!(toml_string.contains("baud_rate = 9600"));
    }

    #[test]
    fn test_unknown_device_kind_rejected() {
        let result: std::result::Result<AppConfig, _> =
            toml::from_str("[device]\nkind = \"bluetooth\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.world.width = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = AppConfig::default();
        config.protocol.max_poll_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.protocol.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.world.obstacles.push([10, 0]);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.world.robot = Some(RobotPlacement {
            col: 0,
            row: 10,
            heading: Heading::North,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_world() {
        let mut config = AppConfig::default();
        config.world.width = 5;
        config.world.height = 5;
        config.world.obstacles = vec![[2, 1]];
        config.world.robot = Some(RobotPlacement {
            col: 2,
            row: 2,
            heading: Heading::West,
        });

        let world = config.build_world().unwrap();
        assert_eq!(
            world.grid().get(Position::new(2, 1)),
            Some(Cell::ObstacleUnidentified)
        );
        assert_eq!(
            world.grid().get(Position::new(2, 2)),
            Some(Cell::RobotOccupied)
        );
        assert_eq!(world.robot().unwrap().heading(), Heading::West);
    }

    #[test]
    fn test_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("setu-config-{}.toml", std::process::id()));
        let mut config = AppConfig::emulated_defaults();
        config.device.seed = 7;
        config.to_file(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded.device.kind, DeviceKind::Emulated);
        assert_eq!(loaded.device.seed, 7);
        let _ = fs::remove_file(&path);
    }
}
