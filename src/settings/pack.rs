use common::Settings;
use packed_struct::prelude::*;

pub const RECORD_SIZE: usize = 8;

// Settings record (8 bytes, same layout as the C struct on a 32-bit LE MCU):
// Byte # | Definition
// 0..=3  | Time zone offset, signed, little-endian
// 4      | Daylight saving flag, non-zero = enabled
// 5..=7  | Padding
#[derive(PackedStruct, Default, Debug, PartialEq, Clone)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "8")]
pub struct SettingsRecordPack {
    #[packed_field(bytes = "0..=3", endian = "lsb")]
    pub time_zone_offset: i32,
    #[packed_field(bytes = "4")]
    pub is_summer_time: u8,
    #[packed_field(bytes = "5..=7")]
    pub padding: [u8; 3],
}

impl From<Settings> for SettingsRecordPack {
    fn from(settings: Settings) -> Self {
        SettingsRecordPack {
            time_zone_offset: settings.time_zone_offset,
            is_summer_time: settings.is_summer_time as u8,
            ..Default::default()
        }
    }
}

impl From<SettingsRecordPack> for Settings {
    fn from(record: SettingsRecordPack) -> Self {
        Settings {
            time_zone_offset: record.time_zone_offset,
            is_summer_time: record.is_summer_time != 0,
        }
    }
}
