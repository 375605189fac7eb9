use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::trace;

pub const REFRESH_PERIOD: Duration = Duration::from_millis(1000);
pub const BLINK_PERIOD: Duration = Duration::from_millis(500);

/// Milliseconds since some fixed point. Wraps like a microcontroller tick
/// counter, so timers only ever look at differences.
pub trait MonotonicClock {
    fn now_ms(&self) -> u64;
}

pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Clock moved by hand. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl MonotonicClock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// A named periodic timer.
///
/// When due it restarts from the time it was checked, not from when it
/// should have fired. Late checks push later ticks back instead of firing
/// several times to catch up.
#[derive(Clone, Debug)]
pub struct Timer {
    name: &'static str,
    period_ms: u64,
    last_ms: u64,
}

impl Timer {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period_ms: period.as_millis() as u64,
            last_ms: 0,
        }
    }

    /// Fires at most once per call and rearms at `now_ms`
    pub fn due(&mut self, now_ms: u64) -> bool {
        if now_ms.wrapping_sub(self.last_ms) >= self.period_ms {
            trace!("Timer {} fired at {}ms", self.name, now_ms);
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }
}

/// Which timers fired during one pass of the loop
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ticks {
    pub blink: bool,
    pub refresh: bool,
}

/// The two display timers. They run independently and may both fire in the
/// same pass; blink is always checked first.
#[derive(Clone, Debug)]
pub struct Scheduler {
    blink: Timer,
    refresh: Timer,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(REFRESH_PERIOD, BLINK_PERIOD)
    }
}

impl Scheduler {
    pub fn new(refresh: Duration, blink: Duration) -> Self {
        Self {
            blink: Timer::new("blink", blink),
            refresh: Timer::new("refresh", refresh),
        }
    }

    pub fn poll(&mut self, now_ms: u64) -> Ticks {
        let blink = self.blink.due(now_ms);
        let refresh = self.refresh.due(now_ms);
        Ticks { blink, refresh }
    }
}
