//! Bit-banged driver for HX711-class strain-gauge ADCs
//!
//! Talks to the chip over two GPIO lines, turns raw 24-bit conversions
//! into calibrated physical units, and rejects transient spikes with a
//! bounded running-median filter.
//!
//! Key constraints:
//! - `no_std` by default, one allocation per filter at construction
//! - Blocking only in the ready-wait loop, with a cooperative yield on
//!   every poll iteration
//! - All expected failures are values, never panics
//!
//! ```no_run
//! use loadbridge_core::{Gain, MockPlatform, Scale};
//!
//! let mut platform = MockPlatform::new();
//! platform.push_sample(120_000);
//!
//! let mut scale = Scale::new(platform, 16, 4, Gain::A128);
//! scale.begin();
//!
//! match scale.read(1000) {
//!     Ok(_raw) => {} // sign-extended 24-bit conversion
//!     Err(_e) => {}  // timed out waiting for the chip
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod calibration;
pub mod errors;
pub mod hal;
pub mod median;
pub mod reader;
pub mod scale;
pub mod time;

// Public API
pub use calibration::Calibration;
pub use errors::{MeasureError, MeasureResult};
pub use hal::{BitOrder, Level, MockPlatform, Pin, PinMode, Platform};
pub use median::RunningMedian;
pub use reader::{BitstreamReader, Gain};
pub use scale::{Scale, DEFAULT_READ_TIMEOUT_MS, DEFAULT_SAMPLE_COUNT};
pub use time::{TimeSource, Timestamp};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
