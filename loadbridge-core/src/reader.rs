//! Conversion-result protocol for HX711-class ADCs
//!
//! The chip signals a finished conversion by dropping its data line; the
//! host then clocks out 24 bits MSB-first and appends one to three extra
//! clock pulses that select channel and gain for the *next* conversion.
//! From the datasheet: when output data is not ready for retrieval, the
//! data line stays high and the clock line should be low; the data line
//! going low indicates data is ready.

use crate::errors::{MeasureError, MeasureResult};
use crate::hal::{BitOrder, Level, Pin, PinMode, Platform};

/// Channel/gain selection code
///
/// Encoded on the wire as the number of clock pulses issued after the 24
/// data bits. Channel A supports gain 128 or 64; channel B is fixed at
/// gain 32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gain {
    /// Channel A, gain factor 128 (one extra pulse)
    #[default]
    A128,
    /// Channel A, gain factor 64 (three extra pulses)
    A64,
    /// Channel B, gain factor 32 (two extra pulses)
    B32,
}

impl Gain {
    /// Map a datasheet gain factor to its code
    ///
    /// Anything other than 128, 64 or 32 falls back to [`Gain::A128`]
    /// rather than failing.
    pub const fn from_factor(factor: u8) -> Self {
        match factor {
            128 => Self::A128,
            64 => Self::A64,
            32 => Self::B32,
            _ => Self::A128,
        }
    }

    /// Clock pulses sent after the 24 data bits to program this code
    pub const fn pulse_count(self) -> u8 {
        match self {
            Self::A128 => 1,
            Self::A64 => 3,
            Self::B32 => 2,
        }
    }
}

/// Executes the 24-bit read protocol on a pair of GPIO pins
///
/// Owns nothing beyond the pin assignments and the configured gain code;
/// every operation borrows the [`Platform`] that actually drives the
/// wires, so one platform can serve several chips on different pins.
#[derive(Debug, Clone)]
pub struct BitstreamReader {
    /// Serial data output of the chip (input on the host side)
    dout: Pin,
    /// Power-down and serial clock input of the chip
    pd_sck: Pin,
    gain: Gain,
}

impl BitstreamReader {
    /// Bind the reader to its data and clock pins
    pub const fn new(dout: Pin, pd_sck: Pin, gain: Gain) -> Self {
        Self { dout, pd_sck, gain }
    }

    /// Configure pin directions and park the clock low
    pub fn begin<P: Platform>(&self, platform: &mut P) {
        platform.set_pin_mode(self.pd_sck, PinMode::Output);
        platform.set_pin_mode(self.dout, PinMode::Input);
        platform.write_digital(self.pd_sck, Level::Low);
    }

    /// Currently configured channel/gain code
    pub fn gain(&self) -> Gain {
        self.gain
    }

    /// Select channel and gain; takes effect after the next read
    pub fn set_gain<P: Platform>(&mut self, gain: Gain, platform: &mut P) {
        self.gain = gain;
        platform.write_digital(self.pd_sck, Level::Low);
    }

    /// Whether a conversion is ready for retrieval (data line low)
    pub fn is_ready<P: Platform>(&self, platform: &P) -> bool {
        platform.read_digital(self.dout) == Level::Low
    }

    /// Wait for a conversion and clock it out
    ///
    /// Polls readiness against the platform clock, ceding control through
    /// the yield hook on every iteration - watchdog-sensitive hosts and
    /// cooperative schedulers depend on that. A conversion landing exactly
    /// at the deadline still succeeds; otherwise the call reports
    /// [`MeasureError::TimedOut`] and performs no retries.
    pub fn read<P: Platform>(&self, platform: &mut P, timeout_ms: u32) -> MeasureResult<i32> {
        let start = platform.now();
        while !self.is_ready(platform)
            && platform.now().saturating_sub(start) < u64::from(timeout_ms)
        {
            platform.yield_now();
        }
        if !self.is_ready(platform) {
            return Err(MeasureError::TimedOut { timeout_ms });
        }

        Ok(self.clock_in(platform))
    }

    /// Non-blocking read: `WouldBlock` until the chip is ready
    pub fn try_read<P: Platform>(&self, platform: &mut P) -> nb::Result<i32, MeasureError> {
        if !self.is_ready(platform) {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.clock_in(platform))
    }

    /// One full protocol cycle; the chip must already be ready
    fn clock_in<P: Platform>(&self, platform: &mut P) -> i32 {
        // 24 data bits, most significant byte first
        let b2 = platform.shift_in_byte(self.dout, self.pd_sck, BitOrder::MsbFirst);
        let b1 = platform.shift_in_byte(self.dout, self.pd_sck, BitOrder::MsbFirst);
        let b0 = platform.shift_in_byte(self.dout, self.pd_sck, BitOrder::MsbFirst);

        // program channel/gain for the next conversion; this never affects
        // the sample just clocked out
        for _ in 0..self.gain.pulse_count() {
            platform.write_digital(self.pd_sck, Level::High);
            platform.write_digital(self.pd_sck, Level::Low);
        }

        // replicate bit 23 across the top byte of the widened word
        let filler: u32 = if b2 & 0x80 != 0 { 0xFF } else { 0x00 };
        let value = (filler << 24) | (u32::from(b2) << 16) | (u32::from(b1) << 8) | u32::from(b0);
        value as i32
    }

    /// Hold the clock high to put the chip into power-down mode
    pub fn power_down<P: Platform>(&self, platform: &mut P) {
        platform.write_digital(self.pd_sck, Level::Low);
        platform.write_digital(self.pd_sck, Level::High);
    }

    /// Release the clock; the chip wakes and resumes converting
    pub fn power_up<P: Platform>(&self, platform: &mut P) {
        platform.write_digital(self.pd_sck, Level::Low);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockPlatform;

    const DOUT: Pin = 16;
    const PD_SCK: Pin = 4;

    fn reader(gain: Gain) -> BitstreamReader {
        BitstreamReader::new(DOUT, PD_SCK, gain)
    }

    #[test]
    fn gain_factor_mapping_is_exhaustive() {
        assert_eq!(Gain::from_factor(128), Gain::A128);
        assert_eq!(Gain::from_factor(64), Gain::A64);
        assert_eq!(Gain::from_factor(32), Gain::B32);
        // out-of-range factors resolve to the default, never fail
        assert_eq!(Gain::from_factor(0), Gain::A128);
        assert_eq!(Gain::from_factor(255), Gain::A128);
    }

    #[test]
    fn gain_pulse_counts() {
        assert_eq!(Gain::A128.pulse_count(), 1);
        assert_eq!(Gain::A64.pulse_count(), 3);
        assert_eq!(Gain::B32.pulse_count(), 2);
        assert_eq!(Gain::default(), Gain::A128);
    }

    #[test]
    fn begin_configures_pins() {
        let mut platform = MockPlatform::new();
        reader(Gain::A128).begin(&mut platform);

        assert_eq!(
            platform.modes(),
            &[(PD_SCK, PinMode::Output), (DOUT, PinMode::Input)]
        );
    }

    #[test]
    fn positive_sample_assembles_without_filler() {
        let mut platform = MockPlatform::new();
        platform.push_bytes(&[0x7F, 0xFF, 0xFF]);

        let value = reader(Gain::A128).read(&mut platform, 1000).unwrap();
        assert_eq!(value, 0x007F_FFFF);
    }

    #[test]
    fn negative_sample_is_sign_extended() {
        let mut platform = MockPlatform::new();
        platform.push_bytes(&[0x80, 0x00, 0x00]);

        let value = reader(Gain::A128).read(&mut platform, 1000).unwrap();
        assert_eq!(value, -8_388_608);
        // top byte replicates bit 23
        assert_eq!((value as u32) >> 24, 0xFF);
    }

    #[test]
    fn gain_pulses_follow_every_read() {
        for (gain, expected) in [(Gain::A128, 1), (Gain::A64, 3), (Gain::B32, 2)] {
            let mut platform = MockPlatform::new();
            platform.push_sample(1234);

            reader(gain).read(&mut platform, 1000).unwrap();
            assert_eq!(platform.pulses(), expected, "gain {:?}", gain);
        }
    }

    #[test]
    fn read_times_out_when_never_ready() {
        let mut platform = MockPlatform::new().never_ready();

        let result = reader(Gain::A128).read(&mut platform, 50);
        assert_eq!(result, Err(MeasureError::TimedOut { timeout_ms: 50 }));
        // the wait loop must cede control on every poll iteration
        assert!(platform.yields() > 0);
        // nothing was clocked out
        assert_eq!(platform.pulses(), 0);
    }

    #[test]
    fn read_returns_once_signal_drops() {
        let mut platform = MockPlatform::new().ready_after(5);
        platform.push_sample(77);

        let value = reader(Gain::A128).read(&mut platform, 1000).unwrap();
        assert_eq!(value, 77);
        assert!(platform.yields() > 0);
    }

    #[test]
    fn try_read_would_block_until_ready() {
        let mut platform = MockPlatform::new();
        let r = reader(Gain::A128);

        // empty script == no conversion pending
        assert_eq!(r.try_read(&mut platform), Err(nb::Error::WouldBlock));

        platform.push_sample(-42);
        assert_eq!(r.try_read(&mut platform), Ok(-42));
    }

    #[test]
    fn power_down_raises_clock_after_lowering() {
        let mut platform = MockPlatform::new();
        let r = reader(Gain::A128);

        r.power_down(&mut platform);
        assert_eq!(platform.pulses(), 1);

        // wake-up only drives the line low again
        r.power_up(&mut platform);
        assert_eq!(platform.pulses(), 1);
    }
}
