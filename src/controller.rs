use std::io::Write;

use anyhow::Error;
use common::{DateTime, Mode, Settings};
use log::{debug, error, info, warn};

use crate::commands::{self, Command};
use crate::display::{DisplayOutput, DisplayState, DisplayWord};
use crate::gps::{GpsReceiver, GpsSource};
use crate::scheduler::{Scheduler, Ticks};
use crate::settings::{Eeprom, SettingsStore};
use crate::timezone::local_date_time;

pub const WAITING_FOR_FIX: &str = "Waiting for valid GPS date and time";

/// All state of the running clock. One instance lives for the whole run and
/// is driven by a single loop calling `step`.
pub struct Controller<E, O, W> {
    store: SettingsStore<E>,
    settings: Settings,
    mode: Mode,
    gps: GpsReceiver,
    utc: Option<DateTime>,
    local: Option<DateTime>,
    display: DisplayState,
    scheduler: Scheduler,
    output: O,
    console: W,
    gps_buf: Vec<u8>,
}

impl<E, O, W> Controller<E, O, W>
where
    E: Eeprom,
    O: DisplayOutput,
    W: Write,
{
    /// Load the settings and report them on the console
    pub fn start(
        mut store: SettingsStore<E>,
        output: O,
        mut console: W,
        scheduler: Scheduler,
    ) -> Result<Self, Error> {
        let loaded = store.load()?;
        if loaded.repaired {
            writeln!(console, "Invalid settings. Loading defaults.")?;
        }

        let mut controller = Self {
            store,
            settings: loaded.settings,
            mode: Mode::default(),
            gps: GpsReceiver::new(),
            utc: None,
            local: None,
            display: DisplayState::default(),
            scheduler,
            output,
            console,
            gps_buf: Vec::with_capacity(256),
        };
        controller.print_settings()?;

        Ok(controller)
    }

    /// One pass of the loop: drain the navigation module, run at most one
    /// console command, then service the timers.
    pub fn step<S: GpsSource + ?Sized>(
        &mut self,
        source: &mut S,
        line: Option<&str>,
        now_ms: u64,
    ) -> Result<Ticks, Error> {
        self.poll_gps(source)?;

        if let Some(line) = line {
            if let Err(e) = self.handle_line(line) {
                error!("Command {:?} failed: {}", line.trim(), e);
                writeln!(self.console, "Error: {}", e)?;
            }
        }

        self.tick(now_ms)
    }

    pub fn poll_gps<S: GpsSource + ?Sized>(&mut self, source: &mut S) -> Result<(), Error> {
        let mut buf = std::mem::take(&mut self.gps_buf);
        buf.clear();

        let result = match source.read_available(&mut buf) {
            Ok(_) => self.ingest(&buf),
            Err(e) => {
                warn!("GPS: read failed: {}", e);
                Ok(())
            }
        };

        self.gps_buf = buf;
        result
    }

    /// Hand bytes to the parser, echoing them in raw mode
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return Ok(());
        }

        self.gps.feed(bytes);
        if self.mode == Mode::Raw {
            self.console.write_all(bytes)?;
            self.console.flush()?;
        }

        Ok(())
    }

    /// Run one console line. Rejected input is reported on the console and
    /// leaves everything unchanged. A failed save is returned and also
    /// leaves everything unchanged.
    pub fn handle_line(&mut self, line: &str) -> Result<(), Error> {
        if line.trim().is_empty() {
            return Ok(());
        }

        match Command::parse(line) {
            Ok(command) => self.apply(command),
            Err(e) => {
                info!("Rejected command: {}", e);
                writeln!(self.console, "{}", commands::rejection(&e))?;
                Ok(())
            }
        }
    }

    pub fn apply(&mut self, command: Command) -> Result<(), Error> {
        debug!("Applying {:?}", command);

        match command {
            Command::Raw => {
                self.mode = Mode::Raw;
                writeln!(self.console, "Mode: RAW")?;
            }
            Command::Clock => {
                self.mode = Mode::Clock;
                writeln!(self.console, "Mode: CLOCK")?;
            }
            Command::Offset(offset) => {
                self.update_settings(Settings {
                    time_zone_offset: offset,
                    ..self.settings
                })?;
                self.mode = Mode::OffsetReport;
                writeln!(self.console, "Time Zone Offset: {}", offset)?;
            }
            Command::Daylight(enabled) => {
                self.update_settings(Settings {
                    is_summer_time: enabled,
                    ..self.settings
                })?;
                self.mode = Mode::DaylightReport;
                writeln!(self.console, "Daylight Saving: {}", enabled_text(enabled))?;
            }
        }

        Ok(())
    }

    fn update_settings(&mut self, settings: Settings) -> Result<(), Error> {
        self.store.save(&settings)?;
        self.settings = settings;
        Ok(())
    }

    /// Service both timers. Blink is checked before refresh so a refresh in
    /// the same pass renders with the separator phase just set.
    pub fn tick(&mut self, now_ms: u64) -> Result<Ticks, Error> {
        let ticks = self.scheduler.poll(now_ms);

        if ticks.blink {
            let word = self.display.toggle_separator();
            self.show(word);
        }

        if ticks.refresh {
            self.refresh()?;
        }

        Ok(ticks)
    }

    fn refresh(&mut self) -> Result<(), Error> {
        let Some(utc) = self.gps.utc() else {
            debug!("No GPS date and time yet");
            writeln!(self.console, "{}", WAITING_FOR_FIX)?;
            return Ok(());
        };

        let local = local_date_time(
            utc,
            self.settings.time_zone_offset,
            self.settings.is_summer_time,
        );
        self.utc = Some(utc);
        self.local = Some(local);

        match self.display.set_time(&local) {
            Ok(word) => self.show(word),
            Err(e) => error!("Failed to render {}: {}", local, e),
        }

        if self.mode.prints_time() {
            writeln!(self.console, "UTC Time: {}", utc)?;
            writeln!(self.console, "My Time:  {}", local)?;
        }

        Ok(())
    }

    fn show(&mut self, word: DisplayWord) {
        if let Err(e) = self.output.write_frame(word) {
            error!("Failed to update display: {}", e);
        }
    }

    pub fn print_settings(&mut self) -> Result<(), Error> {
        writeln!(self.console, "Loaded Settings:")?;
        writeln!(
            self.console,
            "Time Zone Offset: {}",
            self.settings.time_zone_offset
        )?;
        writeln!(
            self.console,
            "Daylight Saving: {}",
            enabled_text(self.settings.is_summer_time)
        )?;
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn utc(&self) -> Option<DateTime> {
        self.utc
    }

    pub fn local(&self) -> Option<DateTime> {
        self.local
    }

    pub fn display_word(&self) -> DisplayWord {
        self.display.word()
    }

    pub fn store(&self) -> &SettingsStore<E> {
        &self.store
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn console(&self) -> &W {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut W {
        &mut self.console
    }
}

fn enabled_text(enabled: bool) -> &'static str {
    if enabled {
        "Enabled"
    } else {
        "Disabled"
    }
}
