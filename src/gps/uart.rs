use std::io;
use std::time::Duration;

use log::info;
use rppal::uart::{Parity, Uart};

use super::GpsSource;

/// Navigation module on a Pi UART, read without blocking
pub struct UartGpsSource {
    uart: Uart,
}

impl UartGpsSource {
    pub fn open(path: &str, baud: u32) -> Result<Self, anyhow::Error> {
        let mut uart = Uart::with_path(path, baud, Parity::None, 8, 1)?;
        // Return immediately with whatever is in the receive buffer
        uart.set_read_mode(0, Duration::ZERO)?;
        info!("GPS: listening on {} at {} baud", path, baud);

        Ok(Self { uart })
    }
}

impl GpsSource for UartGpsSource {
    fn read_available(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        let mut chunk = [0u8; 64];
        let mut total = 0;
        loop {
            let read = self.uart.read(&mut chunk).map_err(io::Error::other)?;
            if read == 0 {
                return Ok(total);
            }
            buf.extend_from_slice(&chunk[..read]);
            total += read;
        }
    }
}
