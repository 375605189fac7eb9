use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Error};
use pi_pinout::{GpioPin, PhysicalPin, WiringPiPin};
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH: &str = "config.ron";

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub display: DisplayPins,
    pub gps: GpsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Lines of the 74HC595 chain
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct DisplayPins {
    pub data: Pin,
    pub clock: Pin,
    pub latch: Pin,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum Pin {
    Physical(PhysicalPin),
    Gpio(GpioPin),
    WiringPi(WiringPiPin),
}

impl Pin {
    pub fn gpio(self) -> GpioPin {
        match self {
            Pin::Physical(pin) => pin.into(),
            Pin::Gpio(pin) => pin,
            Pin::WiringPi(pin) => pin.into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub enum GpsConfig {
    /// Serial port wired to the module
    Uart {
        path: String,
        #[serde(default = "default_gps_baud")]
        baud: u32,
    },
    /// NMEA log played back one line at a time
    Replay {
        path: PathBuf,
        #[serde(default = "default_line_delay_ms")]
        line_delay_ms: u64,
        #[serde(default)]
        repeat: bool,
    },
}

fn default_gps_baud() -> u32 {
    9_600
}

fn default_line_delay_ms() -> u64 {
    1_000
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub size: usize,
    /// Where the settings record starts
    pub base_offset: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("settings.eeprom"),
            size: 4096,
            base_offset: 0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub refresh_ms: u64,
    pub blink_ms: u64,
    /// Sleep between loop passes
    pub poll_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            refresh_ms: 1000,
            blink_ms: 500,
            poll_ms: 5,
        }
    }
}

impl TimingConfig {
    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    pub fn blink(&self) -> Duration {
        Duration::from_millis(self.blink_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

impl Config {
    pub fn load() -> Result<Config, Error> {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Config, Error> {
        let path = path.as_ref();
        let config = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            ron::from_str(&config).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }
}
