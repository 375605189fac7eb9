use embedded_hal::digital::{Error as _, ErrorKind, OutputPin, PinState};
use thiserror::Error;

use super::DisplayWord;

/// Four chained 8-bit registers
pub const FRAME_BITS: u32 = 32;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("failed to drive {line} line: {kind:?}")]
    Pin { line: &'static str, kind: ErrorKind },
}

/// Anything that can show a complete frame
pub trait DisplayOutput {
    fn write_frame(&mut self, word: DisplayWord) -> Result<(), DisplayError>;
}

impl<T: DisplayOutput + ?Sized> DisplayOutput for Box<T> {
    fn write_frame(&mut self, word: DisplayWord) -> Result<(), DisplayError> {
        (**self).write_frame(word)
    }
}

/// 74HC595 chain on three lines.
///
/// The latch is held low while all 32 bits are clocked in and only raised
/// after the last one, so the outputs switch to the new frame in one step.
pub struct ShiftRegister<D, C, L> {
    data: D,
    clock: C,
    latch: L,
}

impl<D, C, L> ShiftRegister<D, C, L>
where
    D: OutputPin,
    C: OutputPin,
    L: OutputPin,
{
    pub fn new(data: D, clock: C, latch: L) -> Self {
        Self { data, clock, latch }
    }

    pub fn release(self) -> (D, C, L) {
        (self.data, self.clock, self.latch)
    }

    /// Shift one frame out MSB first and latch it
    pub fn shift_out(&mut self, bits: u32) -> Result<(), DisplayError> {
        self.latch.set_low().map_err(|e| pin_error("latch", e.kind()))?;

        for i in (0..FRAME_BITS).rev() {
            let state = PinState::from(bits & (1 << i) != 0);
            self.data
                .set_state(state)
                .map_err(|e| pin_error("data", e.kind()))?;

            // Rising edge shifts the bit in
            self.clock.set_high().map_err(|e| pin_error("clock", e.kind()))?;
            self.clock.set_low().map_err(|e| pin_error("clock", e.kind()))?;
        }

        self.latch.set_high().map_err(|e| pin_error("latch", e.kind()))
    }
}

impl<D, C, L> DisplayOutput for ShiftRegister<D, C, L>
where
    D: OutputPin,
    C: OutputPin,
    L: OutputPin,
{
    fn write_frame(&mut self, word: DisplayWord) -> Result<(), DisplayError> {
        self.shift_out(word.bits())
    }
}

fn pin_error(line: &'static str, kind: ErrorKind) -> DisplayError {
    DisplayError::Pin { line, kind }
}
