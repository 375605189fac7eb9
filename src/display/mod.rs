use std::fmt::{self, Display};

use common::DateTime;
use log::debug;
use packed_struct::PackingError;

use self::pack::DisplayFramePack;

pub mod digits;
pub mod pack;
pub mod shift_register;

pub use shift_register::{DisplayError, DisplayOutput, ShiftRegister};

/// Bit of the frame that drives the colon between hours and minutes. It is
/// the decimal point of the hour units digit.
pub const SEPARATOR_BIT: u32 = 16;
pub const SEPARATOR_MASK: u32 = 1 << SEPARATOR_BIT;

/// One complete frame for the four chained shift registers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayWord(pub u32);

impl DisplayWord {
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Segment patterns, hour tens first
    pub fn digits(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub fn separator_on(&self) -> bool {
        // Active-low like every other segment
        self.0 & SEPARATOR_MASK == 0
    }
}

impl Display for DisplayWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self
            .digits()
            .map(|d| digits::decode(d).map_or('?', |d| char::from(b'0' + d)));

        write!(
            f,
            "{}{}{}{}{} (0x{:08X})",
            digits[0],
            digits[1],
            if self.separator_on() { ':' } else { ' ' },
            digits[2],
            digits[3],
            self.0
        )
    }
}

/// Segment patterns for `HH MM` of the given time, without the separator.
pub fn encode_time(local: &DateTime) -> Result<u32, PackingError> {
    let hour = local.hour.clamp(0, 23) as u8;
    let minute = local.minute.clamp(0, 59) as u8;

    DisplayFramePack::from_digits([
        digits::encode(hour / 10),
        digits::encode(hour % 10),
        digits::encode(minute / 10),
        digits::encode(minute % 10),
    ])
    .pack_word()
}

/// Compose the frame for a local time with the separator lit or dark.
pub fn render(local: &DateTime, blink_on: bool) -> Result<DisplayWord, PackingError> {
    let digits = encode_time(local)?;
    Ok(DisplayWord(apply_separator(digits, blink_on)))
}

fn apply_separator(digits: u32, blink_on: bool) -> u32 {
    if blink_on {
        digits ^ SEPARATOR_MASK
    } else {
        digits
    }
}

/// Render state owned by the controller. Digits change on the refresh tick,
/// the separator phase on the blink tick, and neither touches the other.
#[derive(Clone, Debug)]
pub struct DisplayState {
    digits: u32,
    blink_on: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            digits: u32::MAX,
            blink_on: false,
        }
    }
}

impl DisplayState {
    pub fn word(&self) -> DisplayWord {
        DisplayWord(apply_separator(self.digits, self.blink_on))
    }

    pub fn blink_on(&self) -> bool {
        self.blink_on
    }

    pub fn toggle_separator(&mut self) -> DisplayWord {
        self.blink_on = !self.blink_on;
        self.word()
    }

    pub fn set_time(&mut self, local: &DateTime) -> Result<DisplayWord, PackingError> {
        self.digits = encode_time(local)?;
        let word = self.word();
        debug!("Display: {}", word);
        Ok(word)
    }
}
