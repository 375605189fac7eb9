use common::Settings;
use log::{info, warn};
use packed_struct::prelude::*;

use self::pack::{SettingsRecordPack, RECORD_SIZE};

pub mod eeprom;
pub mod pack;

pub use eeprom::{Eeprom, FileEeprom, MemoryEeprom, StorageError};

/// Result of reading the settings record at startup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadedSettings {
    pub settings: Settings,
    /// The stored record was out of range and has been overwritten with
    /// the defaults
    pub repaired: bool,
}

/// Settings record kept at a fixed offset of a persistent medium.
pub struct SettingsStore<E> {
    eeprom: E,
    base_offset: usize,
}

impl<E: Eeprom> SettingsStore<E> {
    pub fn new(eeprom: E, base_offset: usize) -> Self {
        Self {
            eeprom,
            base_offset,
        }
    }

    /// Read the stored record. An offset outside -12..=14 means the record
    /// is garbage, so the defaults are written back before returning them.
    pub fn load(&mut self) -> Result<LoadedSettings, StorageError> {
        let mut bytes = [0u8; RECORD_SIZE];
        self.eeprom.read(self.base_offset, &mut bytes)?;
        let settings = Settings::from(SettingsRecordPack::unpack(&bytes)?);

        if settings.is_valid() {
            info!(
                "Settings: loaded offset {} with daylight saving {}",
                settings.time_zone_offset, settings.is_summer_time
            );
            return Ok(LoadedSettings {
                settings,
                repaired: false,
            });
        }

        warn!(
            "Settings: stored offset {} is out of range, restoring defaults",
            settings.time_zone_offset
        );
        let settings = Settings::default();
        self.save(&settings)?;

        Ok(LoadedSettings {
            settings,
            repaired: true,
        })
    }

    /// Write and commit the record. Failures are returned as-is.
    pub fn save(&mut self, settings: &Settings) -> Result<(), StorageError> {
        let bytes = SettingsRecordPack::from(*settings).pack()?;
        self.eeprom.write(self.base_offset, &bytes)?;
        self.eeprom.commit()?;

        info!(
            "Settings: saved offset {} with daylight saving {}",
            settings.time_zone_offset, settings.is_summer_time
        );
        Ok(())
    }

    pub fn eeprom(&self) -> &E {
        &self.eeprom
    }

    pub fn into_inner(self) -> E {
        self.eeprom
    }
}
