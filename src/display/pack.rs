use packed_struct::prelude::*;

// Display frame (32-bit, shifted MSB first into four chained 74HC595s):
// Byte # | Bits | Definition
// 0      | 0xFF | Hour tens segment pattern
// 1      | 0xFF | Hour units segment pattern (bit 0 doubles as the separator)
// 2      | 0xFF | Minute tens segment pattern
// 3      | 0xFF | Minute units segment pattern
#[derive(PackedStruct, Default, Debug, PartialEq, Clone, Copy)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "4")]
pub struct DisplayFramePack {
    #[packed_field(bytes = "0")]
    pub hour_tens: u8,
    #[packed_field(bytes = "1")]
    pub hour_units: u8,
    #[packed_field(bytes = "2")]
    pub minute_tens: u8,
    #[packed_field(bytes = "3")]
    pub minute_units: u8,
}

impl DisplayFramePack {
    pub fn from_digits(digits: [u8; 4]) -> Self {
        DisplayFramePack {
            hour_tens: digits[0],
            hour_units: digits[1],
            minute_tens: digits[2],
            minute_units: digits[3],
        }
    }

    pub fn pack_word(&self) -> Result<u32, PackingError> {
        Ok(u32::from_be_bytes(self.pack()?))
    }
}
