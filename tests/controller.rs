use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use gps_clock::display::{digits, SEPARATOR_MASK};
use gps_clock::scheduler::ManualClock;
use gps_clock::prelude::*;
use tokio::sync::mpsc;

// 23:50:00 UTC on 2 March 2025
const RMC_LATE_EVENING: &[u8] =
    b"$GPRMC,235000,A,5926.00,N,02445.00,E,000.0,000.0,020325,007.1,E*7D\r\n";
// 00:10:00 UTC on 2 March 2025
const RMC_JUST_AFTER_MIDNIGHT: &[u8] =
    b"$GPRMC,001000,A,4042.70,N,07400.60,W,000.0,000.0,020325,013.0,W*73\r\n";

/// Shift register lines as seen from the chip side: a shared log of
/// (line, level) changes.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Line {
    Data,
    Clock,
    Latch,
}

type Trace = Rc<RefCell<Vec<(Line, bool)>>>;

struct Probe {
    line: Line,
    trace: Trace,
}

impl ErrorType for Probe {
    type Error = Infallible;
}

impl OutputPin for Probe {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.trace.borrow_mut().push((self.line, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.trace.borrow_mut().push((self.line, true));
        Ok(())
    }
}

/// Frames that became visible, i.e. the register contents at each latch
/// rising edge
fn latched(trace: &Trace) -> Vec<u32> {
    let mut frames = Vec::new();
    let mut data = false;
    let mut shift = 0u32;
    for &(line, level) in trace.borrow().iter() {
        match (line, level) {
            (Line::Data, level) => data = level,
            (Line::Clock, true) => shift = (shift << 1) | data as u32,
            (Line::Latch, true) => frames.push(shift),
            _ => {}
        }
    }
    frames
}

type Clock = Controller<MemoryEeprom, ShiftRegister<Probe, Probe, Probe>, Vec<u8>>;

fn start(eeprom: MemoryEeprom) -> (Clock, Trace) {
    let trace = Trace::default();
    let probe = |line| Probe {
        line,
        trace: trace.clone(),
    };
    let register = ShiftRegister::new(probe(Line::Data), probe(Line::Clock), probe(Line::Latch));
    let controller = Controller::start(
        SettingsStore::new(eeprom, 0),
        register,
        Vec::new(),
        Scheduler::default(),
    )
    .unwrap();

    (controller, trace)
}

fn eeprom_with_offset(offset: i32, is_summer_time: bool) -> MemoryEeprom {
    let mut eeprom = MemoryEeprom::new(4096);
    let mut record = [0u8; 8];
    record[..4].copy_from_slice(&offset.to_le_bytes());
    record[4] = is_summer_time as u8;
    eeprom.write(0, &record).unwrap();
    eeprom
}

fn console(controller: &mut Clock) -> String {
    String::from_utf8(std::mem::take(controller.console_mut())).unwrap()
}

fn shown_digits(word: u32) -> Vec<Option<u8>> {
    word.to_be_bytes().iter().map(|d| digits::decode(*d)).collect()
}

#[test]
fn corrupt_settings_are_replaced_with_defaults() {
    let (mut controller, _) = start(eeprom_with_offset(99, true));

    assert_eq!(controller.settings(), Settings::default());
    assert_eq!(controller.store().eeprom().commits(), 1);
    assert_eq!(
        console(&mut controller),
        concat!(
            "Invalid settings. Loading defaults.\n",
            "Loaded Settings:\n",
            "Time Zone Offset: 2\n",
            "Daylight Saving: Disabled\n",
        )
    );
}

#[test]
fn local_time_rolls_into_next_day() {
    let (mut controller, trace) = start(eeprom_with_offset(2, false));
    console(&mut controller);

    controller.ingest(RMC_LATE_EVENING).unwrap();
    let ticks = controller.tick(1000).unwrap();
    assert!(ticks.blink && ticks.refresh);

    let local = controller.local().unwrap();
    assert_eq!((local.day, local.hour, local.minute), (3, 1, 50));
    assert_eq!(
        console(&mut controller),
        "UTC Time: 23:50:00 02/03/25\nMy Time:  01:50:00 03/03/25\n"
    );

    // Blink frame first (blank digits), then the refreshed time
    let frames = latched(&trace);
    assert_eq!(frames.len(), 2);
    assert_eq!(shown_digits(frames[1]), [Some(0), Some(1), Some(5), Some(0)]);
    assert_eq!(frames[1], controller.display_word().bits());
}

#[test]
fn local_time_rolls_into_previous_day() {
    let (mut controller, _) = start(eeprom_with_offset(-5, false));

    controller.ingest(RMC_JUST_AFTER_MIDNIGHT).unwrap();
    controller.tick(1000).unwrap();

    let local = controller.local().unwrap();
    assert_eq!((local.day, local.hour, local.minute), (1, 19, 10));
}

#[test]
fn separator_blinks_between_refreshes() {
    let (mut controller, trace) = start(eeprom_with_offset(2, false));
    controller.ingest(RMC_LATE_EVENING).unwrap();

    let clock = ManualClock::default();
    for step_ms in [1000, 200, 300, 499, 1] {
        clock.advance(step_ms);
        controller.tick(clock.now_ms()).unwrap();
    }

    let frames = latched(&trace);
    // 1000: blink + refresh, 1500: blink, 2000: blink + refresh
    assert_eq!(frames.len(), 5);

    let separators: Vec<bool> = frames.iter().map(|f| f & SEPARATOR_MASK != 0).collect();
    // Active-low: lit, lit, dark, lit, lit
    assert_eq!(separators, [false, false, true, false, false]);

    // Digits never change on a blink tick
    assert_eq!(frames[2] ^ frames[1], SEPARATOR_MASK);
    assert_eq!(frames[4], frames[3]);
}

#[test]
fn each_frame_is_latched_once() {
    let (mut controller, trace) = start(eeprom_with_offset(2, false));
    controller.ingest(RMC_LATE_EVENING).unwrap();
    controller.tick(1000).unwrap();

    let trace = trace.borrow();
    let latch_edges: Vec<bool> = trace
        .iter()
        .filter(|(line, _)| *line == Line::Latch)
        .map(|(_, level)| *level)
        .collect();
    assert_eq!(latch_edges, [false, true, false, true]);

    let clocks = trace
        .iter()
        .filter(|event| **event == (Line::Clock, true))
        .count();
    assert_eq!(clocks, 64);
}

#[test]
fn waiting_for_fix_keeps_last_time() {
    let (mut controller, trace) = start(eeprom_with_offset(0, false));
    console(&mut controller);

    controller.tick(1000).unwrap();
    assert_eq!(console(&mut controller), "Waiting for valid GPS date and time\n");
    assert_eq!(controller.local(), None);
    assert_eq!(latched(&trace).len(), 1);
}

#[test]
fn raw_mode_echoes_and_hides_time() {
    let (mut controller, _) = start(eeprom_with_offset(0, false));
    controller.handle_line("raw").unwrap();
    console(&mut controller);

    controller.ingest(RMC_LATE_EVENING).unwrap();
    controller.tick(1000).unwrap();

    assert_eq!(console(&mut controller).as_bytes(), RMC_LATE_EVENING);
    // Display still follows local time
    assert_eq!(controller.local().map(|l| l.hour), Some(23));

    controller.handle_line("CLOCK").unwrap();
    controller.tick(2000).unwrap();
    let text = console(&mut controller);
    assert!(text.starts_with("Mode: CLOCK\nUTC Time: 23:50:00"));
}

#[test]
fn offset_change_applies_on_next_refresh() {
    let (mut controller, _) = start(eeprom_with_offset(0, false));
    controller.ingest(RMC_LATE_EVENING).unwrap();
    controller.tick(1000).unwrap();
    assert_eq!(controller.local().map(|l| l.hour), Some(23));

    controller.handle_line("offset-3").unwrap();
    controller.handle_line("DAYLIGHTON").unwrap();
    assert_eq!(controller.mode(), Mode::DaylightReport);
    controller.tick(2000).unwrap();
    assert_eq!(controller.local().map(|l| l.hour), Some(21));

    // Both changes were committed to the medium
    let bytes = controller.store().eeprom().bytes();
    assert_eq!(&bytes[..5], &[0xFD, 0xFF, 0xFF, 0xFF, 0x01]);
    assert_eq!(controller.store().eeprom().commits(), 2);
}

#[test]
fn step_reads_source_then_command_then_timers() {
    let (mut controller, _) = start(eeprom_with_offset(2, false));
    let (tx, rx) = mpsc::channel(4);
    let mut source = ChannelGpsSource::new(rx);
    console(&mut controller);

    tx.try_send(RMC_LATE_EVENING.to_vec()).unwrap();
    let ticks = controller.step(&mut source, Some("OFFSET+3"), 1000).unwrap();

    assert!(ticks.refresh);
    assert_eq!(controller.settings().time_zone_offset, 3);
    assert_eq!(controller.mode(), Mode::OffsetReport);
    assert_eq!(controller.local().map(|l| (l.day, l.hour)), Some((3, 2)));
    assert_eq!(
        console(&mut controller),
        "Time Zone Offset: 3\nUTC Time: 23:50:00 02/03/25\nMy Time:  02:50:00 03/03/25\n"
    );
}

/// Medium that accepts writes but can never make them durable
struct BrokenFlash(MemoryEeprom);

impl Eeprom for BrokenFlash {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn read(&self, address: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        self.0.read(address, buf)
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError> {
        self.0.write(address, data)
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("flash erase failed")))
    }
}

#[test]
fn failed_save_keeps_previous_settings() {
    let trace = Trace::default();
    let probe = |line| Probe {
        line,
        trace: trace.clone(),
    };
    let register = ShiftRegister::new(probe(Line::Data), probe(Line::Clock), probe(Line::Latch));
    let store = SettingsStore::new(BrokenFlash(eeprom_with_offset(2, false)), 0);
    let mut controller =
        Controller::start(store, register, Vec::new(), Scheduler::default()).unwrap();
    controller.console_mut().clear();

    assert!(controller.handle_line("OFFSET+5").is_err());
    assert_eq!(controller.settings(), Settings::default());
    assert_eq!(controller.mode(), Mode::Clock);

    let (_tx, rx) = mpsc::channel(1);
    let mut source = ChannelGpsSource::new(rx);
    controller.step(&mut source, Some("DAYLIGHTON"), 0).unwrap();

    assert!(!controller.settings().is_summer_time);
    assert_eq!(controller.mode(), Mode::Clock);
    let text = String::from_utf8(controller.console().clone()).unwrap();
    assert_eq!(text, "Error: storage I/O failed: flash erase failed\n");
}
