use std::time::{Duration, Instant};

use crate::color::Color;
use crate::intervaltimer::IntervalTimer;
use crate::lightstrip::SharedStrip;
use crate::scheduler::CancelToken;

const FRAME_RATE_HZ: f32 = 60.0;

/// Fades the strip from one color to another over the given duration,
/// checking for cancellation before every frame. Elapsed time is measured
/// per iteration from the wall clock so that variable flush latency does
/// not stretch the fade. On uncancelled completion the exact end color is
/// written once, which makes a zero duration a single end-color write.
pub fn run(
    strip: &SharedStrip,
    from: Color,
    to: Color,
    duration: Duration,
    cancel: &CancelToken,
) -> Result<(), String> {
    let total_ms = duration.as_millis() as u64;
    let mut elapsed_ms = 0u64;
    let mut timer = IntervalTimer::new(FRAME_RATE_HZ);

    while elapsed_ms < total_ms {
        if cancel.is_set() {
            return Ok(());
        }

        let frame_start = Instant::now();
        let t = elapsed_ms as f32 / total_ms as f32;
        strip.fill(from.interpolate(to, t));
        strip.update()?;

        timer.sleep_until_next_tick();
        elapsed_ms += frame_start.elapsed().as_millis() as u64;
    }

    if cancel.is_set() {
        return Ok(());
    }

    strip.fill(to);
    strip.update()
}
