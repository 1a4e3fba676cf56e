//! Load-cell device composition
//!
//! [`Scale`] wires the protocol reader, the calibration state and the
//! running-median filter together behind the surface an application
//! actually uses: read, denoise, tare, convert.
//!
//! One `Scale` owns its platform exclusively. The model is single-threaded
//! and cooperative - the only blocking point is the ready-wait inside
//! `read`, and it yields on every poll. Sharing a device across threads
//! needs external synchronization; that is deliberately outside this
//! crate's contract.

use crate::calibration::Calibration;
use crate::errors::{MeasureError, MeasureResult};
use crate::hal::{Pin, Platform};
use crate::median::RunningMedian;
use crate::reader::{BitstreamReader, Gain};

/// Default ready-wait budget for a single conversion
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 1000;

/// Default sample count for [`Scale::read_median`] and [`Scale::tare`]
pub const DEFAULT_SAMPLE_COUNT: usize = 10;

/// A calibrated load-cell channel on one HX711-class chip
pub struct Scale<P: Platform> {
    platform: P,
    reader: BitstreamReader,
    calibration: Calibration,
}

impl<P: Platform> Scale<P> {
    /// Bind a device to its platform, pins and initial gain code
    pub fn new(platform: P, dout: Pin, pd_sck: Pin, gain: Gain) -> Self {
        Self {
            platform,
            reader: BitstreamReader::new(dout, pd_sck, gain),
            calibration: Calibration::default(),
        }
    }

    /// Configure pin directions and park the clock low
    pub fn begin(&mut self) {
        self.reader.begin(&mut self.platform);
    }

    /// Select channel and gain; takes effect after the next read
    pub fn set_gain(&mut self, gain: Gain) {
        self.reader.set_gain(gain, &mut self.platform);
    }

    /// Currently configured channel/gain code
    pub fn gain(&self) -> Gain {
        self.reader.gain()
    }

    /// Whether a conversion is ready for retrieval
    pub fn is_ready(&self) -> bool {
        self.reader.is_ready(&self.platform)
    }

    /// One raw sign-extended conversion, waiting up to `timeout_ms`
    pub fn read(&mut self, timeout_ms: u32) -> MeasureResult<i32> {
        self.reader.read(&mut self.platform, timeout_ms)
    }

    /// Non-blocking read: `WouldBlock` until the chip is ready
    pub fn try_read(&mut self) -> nb::Result<i32, MeasureError> {
        self.reader.try_read(&mut self.platform)
    }

    /// Median of `times` fresh conversions
    ///
    /// `times == 0` reports [`MeasureError::EmptyFilter`] immediately,
    /// without touching the hardware. A timed-out sample fails the whole
    /// call: folding a timeout marker into the median would silently skew
    /// the result, so the error propagates instead.
    pub fn read_median(&mut self, times: usize) -> MeasureResult<i32> {
        if times == 0 {
            return Err(MeasureError::EmptyFilter);
        }

        let mut filter = RunningMedian::new(times);
        for _ in 0..times {
            filter.add(self.read(DEFAULT_READ_TIMEOUT_MS)?);
            self.platform.yield_now();
        }
        filter.median()
    }

    /// Median of `times` conversions, minus the tare offset
    pub fn value(&mut self, times: usize) -> MeasureResult<f64> {
        let median = self.read_median(times)?;
        Ok(self.calibration.value_of(median))
    }

    /// Median of `times` conversions in calibrated units
    pub fn units(&mut self, times: usize) -> MeasureResult<f64> {
        let median = self.read_median(times)?;
        Ok(self.calibration.units_of(median))
    }

    /// Offset-corrected value of an already-obtained raw reading
    pub fn reading_to_value(&self, raw: i32) -> f64 {
        self.calibration.value_of(raw)
    }

    /// Already-obtained raw reading expressed in calibrated units
    pub fn reading_to_units(&self, raw: i32) -> f64 {
        self.calibration.units_of(raw)
    }

    /// Zero the device against the current load
    ///
    /// The median of `times` raw reads becomes the new tare offset.
    pub fn tare(&mut self, times: usize) -> MeasureResult<()> {
        let median = self.read_median(times)?;
        self.calibration.set_offset(median);
        Ok(())
    }

    /// Set the scale factor; exact zero is corrected to `1.0`
    pub fn set_scale(&mut self, scale: f64) {
        self.calibration.set_scale(scale);
    }

    /// Current scale factor
    pub fn scale(&self) -> f64 {
        self.calibration.scale()
    }

    /// Set the tare offset in raw counts
    pub fn set_offset(&mut self, offset: i32) {
        self.calibration.set_offset(offset);
    }

    /// Current tare offset in raw counts
    pub fn offset(&self) -> i32 {
        self.calibration.offset()
    }

    /// Current calibration state
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Put the chip into power-down mode
    pub fn power_down(&mut self) {
        self.reader.power_down(&mut self.platform);
    }

    /// Wake the chip after power-down
    pub fn power_up(&mut self) {
        self.reader.power_up(&mut self.platform);
    }

    /// Consume the device and hand the platform back
    pub fn free(self) -> P {
        self.platform
    }
}
