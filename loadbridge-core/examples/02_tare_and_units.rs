//! Tare and calibration example
//!
//! The usual bring-up sequence for a scale:
//! 1. tare against the empty platter,
//! 2. put a known reference weight on and derive the scale factor,
//! 3. read unknown loads in calibrated units.

use loadbridge_core::{Gain, MockPlatform, Scale, DEFAULT_SAMPLE_COUNT};

const REFERENCE_GRAMS: f64 = 100.0;

fn main() {
    let mut platform = MockPlatform::new();
    // empty platter, then the reference weight, then an unknown load
    for _ in 0..DEFAULT_SAMPLE_COUNT {
        platform.push_sample(8_000);
    }
    for _ in 0..DEFAULT_SAMPLE_COUNT {
        platform.push_sample(12_000);
    }
    platform.push_sample(10_000);

    let mut scale = Scale::new(platform, 16, 4, Gain::A128);
    scale.begin();

    scale.tare(DEFAULT_SAMPLE_COUNT).expect("tare");
    println!("tare offset: {} raw counts", scale.offset());

    let raw_per_reference = scale.value(DEFAULT_SAMPLE_COUNT).expect("calibration read");
    scale.set_scale(raw_per_reference / REFERENCE_GRAMS);
    println!("scale factor: {} counts per gram", scale.scale());

    let grams = scale.units(1).expect("measurement");
    println!("unknown load: {grams} g");
}
