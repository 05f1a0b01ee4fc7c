use std::thread;
use std::time::{Duration, Instant};

/// Paces an animation loop at a fixed frame rate. Overrunning frames do
/// not accumulate debt; the schedule is simply restarted from now.
pub struct IntervalTimer {
    interval: Duration,
    last_tick: Instant,
}

impl IntervalTimer {
    pub fn new(freq_hz: f32) -> IntervalTimer {
        let frame_duration_microsec = 1000.0 / freq_hz * 1000.0;

        IntervalTimer {
            interval: Duration::from_micros(frame_duration_microsec as u64),
            last_tick: Instant::now(),
        }
    }

    pub fn sleep_until_next_tick(&mut self) {
        let next_tick = if self.last_tick + self.interval > Instant::now() {
            self.last_tick + self.interval
        } else {
            log::trace!("Animation frame overran its interval");
            Instant::now() + self.interval
        };

        thread::sleep(next_tick.saturating_duration_since(Instant::now()));
        self.last_tick = next_tick;
    }
}
