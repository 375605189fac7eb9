use std::convert::Infallible;

use anyhow::Error;
use embedded_hal::digital::{ErrorType, OutputPin};
use log::info;

use crate::config::{Config, GpsConfig, Pin};
use crate::display::{DisplayOutput, ShiftRegister};
use crate::gps::{ChannelGpsSource, GpsSource};

#[cfg(feature = "pi")]
use rppal::gpio::Gpio;

/// Stand-in for a GPIO line when not running on a Pi. Remembers its level
/// so the last latched frame can still be inspected.
#[derive(Debug, Default)]
pub struct SimulatedPin {
    pub gpio: u8,
    pub high: bool,
}

impl ErrorType for SimulatedPin {
    type Error = Infallible;
}

impl OutputPin for SimulatedPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

/// Open the shift-register lines named in the config
pub fn open_display(config: &Config) -> Result<Box<dyn DisplayOutput>, Error> {
    let pins = &config.display;
    info!(
        "Display: data on GPIO {}, clock on GPIO {}, latch on GPIO {}",
        pins.data.gpio().0,
        pins.clock.gpio().0,
        pins.latch.gpio().0
    );

    #[cfg(feature = "pi")]
    {
        let gpio = Gpio::new()?;
        let open = |pin: Pin| -> Result<rppal::gpio::OutputPin, Error> {
            Ok(gpio.get(pin.gpio().0)?.into_output_high())
        };
        let data = open(pins.data)?;
        let clock = open(pins.clock)?;
        let latch = open(pins.latch)?;

        Ok(Box::new(ShiftRegister::new(data, clock, latch)))
    }

    #[cfg(not(feature = "pi"))]
    {
        let simulated = |pin: Pin| SimulatedPin {
            gpio: pin.gpio().0,
            high: false,
        };

        Ok(Box::new(ShiftRegister::new(
            simulated(pins.data),
            simulated(pins.clock),
            simulated(pins.latch),
        )))
    }
}

/// Open the navigation module input named in the config
pub fn open_gps(config: &Config) -> Result<Box<dyn GpsSource>, Error> {
    match &config.gps {
        #[cfg(feature = "pi")]
        GpsConfig::Uart { path, baud } => Ok(Box::new(crate::gps::uart::UartGpsSource::open(
            path, *baud,
        )?)),
        #[cfg(not(feature = "pi"))]
        GpsConfig::Uart { path, baud } => {
            info!(
                "GPS: UART needs the pi feature, reading {} as a plain device ({} baud ignored)",
                path,
                baud
            );
            Ok(Box::new(ChannelGpsSource::stream(path.into())))
        }
        GpsConfig::Replay {
            path,
            line_delay_ms,
            repeat,
        } => Ok(Box::new(ChannelGpsSource::replay(
            path.clone(),
            std::time::Duration::from_millis(*line_delay_ms),
            *repeat,
        ))),
    }
}
