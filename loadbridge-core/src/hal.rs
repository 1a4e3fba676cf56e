//! Host platform boundary
//!
//! Everything the driver needs from the outside world crosses this trait:
//! digital pin access, the byte shift-in primitive, a monotonic clock and
//! a cooperative yield hook. Implement [`Platform`] once per target (an
//! RTOS tick, an Arduino-style HAL, a simulator) and the driver itself
//! stays portable and host-testable.
//!
//! Keep implementations simple - the driver calls these in tight loops.

use core::cell::Cell;

use heapless::{Deque, Vec};

use crate::time::{TimeSource, Timestamp};

/// Digital pin identifier
pub type Pin = u8;

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// High-impedance input
    Input,
    /// Push-pull output
    Output,
}

/// Digital line level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Logic low
    Low,
    /// Logic high
    High,
}

/// Bit order for the shift-in primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Most significant bit first
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// Platform services consumed by the driver
///
/// The clock comes in through the [`TimeSource`] supertrait; the rest is
/// pin plumbing plus the yield hook. `yield_now` is called on *every*
/// iteration of a ready-wait loop so that watchdogs and cooperative
/// schedulers keep making progress while the driver blocks.
pub trait Platform: TimeSource {
    /// Configure a pin's direction
    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode);

    /// Drive an output pin
    fn write_digital(&mut self, pin: Pin, level: Level);

    /// Sample an input pin
    fn read_digital(&self, pin: Pin) -> Level;

    /// Sample 8 bits from `data`, one per clock pulse on `clock`
    fn shift_in_byte(&mut self, data: Pin, clock: Pin, order: BitOrder) -> u8;

    /// Cooperative tick; must cede control to the host environment
    fn yield_now(&mut self);
}

/// Bytes the mock can hold in its shift-in script (21 full samples)
pub const MOCK_SCRIPT_CAPACITY: usize = 64;

/// Scripted platform for host-side tests and simulation
///
/// `shift_in_byte` pops bytes from a pre-loaded script; `read_digital`
/// reports the data line low (conversion ready) once the scripted ready
/// instant has passed and bytes remain; the clock advances a fixed tick on
/// every [`TimeSource::now`] call so ready-wait loops terminate
/// deterministically. Clock-pulse, yield and pin-mode activity is recorded
/// for assertions.
///
/// The pulse counter only sees explicit `write_digital` highs; clocking
/// internal to `shift_in_byte` is invisible, which makes the counter read
/// exactly the gain-programming pulses after a conversion.
pub struct MockPlatform {
    now: Cell<Timestamp>,
    tick_ms: u64,
    ready_at: Timestamp,
    script: Deque<u8, MOCK_SCRIPT_CAPACITY>,
    pulses: usize,
    yields: usize,
    modes: Vec<(Pin, PinMode), 8>,
}

impl MockPlatform {
    /// A platform that is ready immediately and ticks 1 ms per `now()`
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            tick_ms: 1,
            ready_at: 0,
            script: Deque::new(),
            pulses: 0,
            yields: 0,
            modes: Vec::new(),
        }
    }

    /// Override the milliseconds the clock advances per `now()` call
    pub fn with_tick(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    /// Delay the ready signal until the clock reaches `at_ms`
    pub fn ready_after(mut self, at_ms: u64) -> Self {
        self.ready_at = at_ms;
        self
    }

    /// Never assert the ready signal; every read will time out
    pub fn never_ready(mut self) -> Self {
        self.ready_at = Timestamp::MAX;
        self
    }

    /// Append one raw byte to the shift-in script
    ///
    /// Bytes beyond the script capacity are dropped.
    pub fn push_byte(&mut self, byte: u8) {
        let _ = self.script.push_back(byte);
    }

    /// Append several raw bytes to the shift-in script
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push_byte(b);
        }
    }

    /// Append one 24-bit conversion result, MSB first
    ///
    /// `raw` is truncated to its low 24 bits (two's complement), which is
    /// what the chip would put on the wire for that value.
    pub fn push_sample(&mut self, raw: i32) {
        let bits = raw as u32;
        self.push_byte((bits >> 16) as u8);
        self.push_byte((bits >> 8) as u8);
        self.push_byte(bits as u8);
    }

    /// Explicit high levels written so far (gain pulses, power-down edge)
    pub fn pulses(&self) -> usize {
        self.pulses
    }

    /// Zero the pulse counter, e.g. between two reads
    pub fn reset_pulses(&mut self) {
        self.pulses = 0;
    }

    /// Yield-hook invocations so far
    pub fn yields(&self) -> usize {
        self.yields
    }

    /// Pin-mode configurations observed, in call order
    pub fn modes(&self) -> &[(Pin, PinMode)] {
        &self.modes
    }

    /// Bytes left in the shift-in script
    pub fn script_len(&self) -> usize {
        self.script.len()
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MockPlatform {
    fn now(&self) -> Timestamp {
        let t = self.now.get();
        self.now.set(t + self.tick_ms);
        t
    }
}

impl Platform for MockPlatform {
    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) {
        let _ = self.modes.push((pin, mode));
    }

    fn write_digital(&mut self, _pin: Pin, level: Level) {
        if level == Level::High {
            self.pulses += 1;
        }
    }

    fn read_digital(&self, _pin: Pin) -> Level {
        // data line low == conversion ready
        if self.now.get() >= self.ready_at && !self.script.is_empty() {
            Level::Low
        } else {
            Level::High
        }
    }

    fn shift_in_byte(&mut self, _data: Pin, _clock: Pin, _order: BitOrder) -> u8 {
        self.script.pop_front().unwrap_or(0)
    }

    fn yield_now(&mut self) {
        self.yields += 1;
    }
}
