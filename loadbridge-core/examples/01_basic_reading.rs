//! Basic reading example
//!
//! Drives the reader against the scripted [`MockPlatform`]. On real
//! hardware you would implement [`loadbridge_core::Platform`] over your
//! board's GPIO, clock and yield primitives and pass that in instead.

use loadbridge_core::{Gain, MockPlatform, Scale};

fn main() {
    // Script three conversions the way the chip would put them on the wire
    let mut platform = MockPlatform::new();
    platform.push_sample(120_000);
    platform.push_sample(120_512);
    platform.push_sample(119_880);

    let mut scale = Scale::new(platform, 16, 4, Gain::A128);
    scale.begin();

    println!("Single conversions:");
    for _ in 0..3 {
        match scale.read(1000) {
            Ok(raw) => println!("  raw = {raw}"),
            Err(e) => println!("  read failed: {e}"),
        }
    }

    // With the script exhausted the chip never becomes ready again
    match scale.read(25) {
        Ok(raw) => println!("unexpected raw = {raw}"),
        Err(e) => println!("as expected: {e}"),
    }
}
