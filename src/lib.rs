pub mod commands;
pub mod config;
pub mod controller;
pub mod display;
pub mod gps;
pub mod hardware;
pub mod scheduler;
pub mod settings;
pub mod timezone;

pub use common::{DateTime, Mode, Settings};

pub mod prelude {
    pub use crate::{
        commands::{Command, CommandError},
        config::*,
        controller::Controller,
        display::{render, DisplayOutput, DisplayState, DisplayWord, ShiftRegister},
        gps::{ChannelGpsSource, GpsReceiver, GpsSource},
        scheduler::{MonotonicClock, Scheduler, SystemClock, Ticks, Timer},
        settings::{Eeprom, FileEeprom, MemoryEeprom, SettingsStore, StorageError},
        timezone::local_date_time,
    };
    pub use common::{DateTime, Mode, Settings};
}
