//! Offset/scale calibration for raw readings
//!
//! Linear model: `value = raw - offset`, `units = value / scale`. Both
//! conversions are pure functions over an already-obtained reading, so
//! captured raw data can be reprocessed offline without touching hardware.

/// Tare offset and scale factor for one load-cell channel
///
/// The scale is never stored as exactly zero: a zero assignment is
/// replaced by the identity scale `1.0`, which keeps every later division
/// well-defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Raw counts subtracted from every reading (tare weight)
    offset: i32,
    /// Raw counts per physical unit, from a reference-weight calibration
    scale: f64,
}

impl Calibration {
    /// Create a calibration; a zero scale is corrected to `1.0`
    pub fn new(offset: i32, scale: f64) -> Self {
        let mut calibration = Self { offset, scale: 1.0 };
        calibration.set_scale(scale);
        calibration
    }

    /// Set the scale factor; exact zero is rejected and becomes `1.0`
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = if scale == 0.0 { 1.0 } else { scale };
    }

    /// Current scale factor
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the tare offset in raw counts
    pub fn set_offset(&mut self, offset: i32) {
        self.offset = offset;
    }

    /// Current tare offset in raw counts
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Offset-corrected value of a raw reading
    #[inline]
    pub fn value_of(&self, raw: i32) -> f64 {
        f64::from(raw) - f64::from(self.offset)
    }

    /// Offset-corrected reading expressed in calibrated units
    #[inline]
    pub fn units_of(&self, raw: i32) -> f64 {
        self.value_of(raw) / self.scale
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self { offset: 0, scale: 1.0 }
    }
}
