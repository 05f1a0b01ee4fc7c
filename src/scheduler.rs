use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::animations::AnimationSpec;
use crate::color::{self, Color};
use crate::lightstrip::SharedStrip;

/// Sleep slice for loops that only wait on the cancel token. Bounds the
/// cancellation latency of every animation.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One-shot cancellation flag shared between the scheduler and exactly one
/// animation run. It only ever goes from unset to set; every run gets a
/// fresh token instead of reusing a cleared one.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

struct Slot {
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
    name: &'static str,
}

/// Owns the single animation thread of the process and the transitions
/// between animations. Transitions cancel the current occupant, join its
/// thread, and only then hand the strip to a successor, so two animations
/// can never write to the strip at the same time. The slot mutex
/// serializes transitions issued from concurrent command threads.
pub struct Scheduler {
    slot: Mutex<Slot>,
    strip: SharedStrip,
}

impl Scheduler {
    /// Creates the scheduler with the idle stand-in parked in the slot.
    pub fn new(strip: SharedStrip) -> Result<Scheduler, String> {
        let cancel = CancelToken::new();
        let handle = spawn_idle(cancel.clone())?;

        Ok(Scheduler {
            slot: Mutex::new(Slot {
                cancel,
                handle: Some(handle),
                name: "idle",
            }),
            strip,
        })
    }

    /// Replaces the running animation with the given one. Blocks until the
    /// previous animation has fully stopped, then returns without waiting
    /// for the new one.
    pub fn start(&self, spec: AnimationSpec) -> Result<(), String> {
        spec.validate()?;

        let mut slot = self.slot.lock().unwrap();
        self.retire(&mut slot);

        let cancel = CancelToken::new();
        let mut animation = spec.into_animation();
        let name = animation.name();
        let strip = self.strip.clone();
        let thread_cancel = cancel.clone();

        let handle = thread::Builder::new()
            .name(format!("anim-{}", name))
            .spawn(move || {
                if let Err(err) = animation.run(&strip, &thread_cancel) {
                    log::warn!("The {} animation died on a device error: {}", name, err);
                }
            })
            .map_err(|error| format!("Failed to create animation thread: {}", error))?;

        slot.cancel = cancel;
        slot.handle = Some(handle);
        slot.name = name;
        log::info!("Started {} animation", name);
        Ok(())
    }

    /// Stops the running animation and turns the strip off. The blanking
    /// write happens strictly after the old animation has stopped.
    pub fn stop(&self) -> Result<(), String> {
        self.park_and_fill(color::BLACK)
    }

    /// Stops the running animation and leaves a static color on the strip.
    pub fn fill(&self, color: Color) -> Result<(), String> {
        self.park_and_fill(color)
    }

    /// Emergency stop: cancels the occupant without joining it and without
    /// scheduling a replacement. Nothing touches the strip again until the
    /// next start or stop, which will still join the dying thread first.
    pub fn kill(&self) {
        let slot = self.slot.lock().unwrap();
        slot.cancel.set();
        log::warn!("Killed {} animation, slot is abandoned", slot.name);
    }

    fn park_and_fill(&self, color: Color) -> Result<(), String> {
        let mut slot = self.slot.lock().unwrap();
        self.retire(&mut slot);

        let cancel = CancelToken::new();
        slot.handle = Some(spawn_idle(cancel.clone())?);
        slot.cancel = cancel;
        slot.name = "idle";

        // The old animation is confirmed dead, so one trailing write is safe.
        self.strip.fill(color);
        self.strip.update()
    }

    /// Cancels the slot occupant and blocks until its thread is gone. An
    /// animation ignoring its token blocks the transition forever; that
    /// violation is made visible in the log rather than papered over.
    fn retire(&self, slot: &mut Slot) {
        slot.cancel.set();
        if let Some(handle) = slot.handle.take() {
            log::debug!("Waiting for {} animation to stop", slot.name);
            if handle.join().is_err() {
                log::error!("The {} animation panicked", slot.name);
            }
        }
    }
}

/// Stand-in occupying the slot while no real animation runs. Never writes
/// to the strip; blocks until its token is set.
fn spawn_idle(cancel: CancelToken) -> Result<JoinHandle<()>, String> {
    thread::Builder::new()
        .name("anim-idle".to_string())
        .spawn(move || {
            while !cancel.is_set() {
                thread::sleep(POLL_INTERVAL);
            }
        })
        .map_err(|error| format!("Failed to create idle thread: {}", error))
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::lightstrip::testing::{FailingStrip, MockStrip, Write};

    fn red_breathing() -> AnimationSpec {
        AnimationSpec::Breathing {
            color: Color::new(255, 0, 0),
            min_brightness: 0.2,
            max_brightness: 1.0,
        }
    }

    fn green_breathing() -> AnimationSpec {
        AnimationSpec::Breathing {
            color: Color::new(0, 255, 0),
            min_brightness: 0.2,
            max_brightness: 1.0,
        }
    }

    #[test]
    fn stop_blanks_the_strip_exactly_once() {
        let (strip, recording) = MockStrip::shared();
        let scheduler = Scheduler::new(strip).unwrap();

        scheduler.stop().unwrap();

        let events = recording.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].write, Write::Fill(color::BLACK));
        assert_eq!(events[1].write, Write::Update);
    }

    #[test]
    fn replaced_animation_never_writes_after_its_successor() {
        let (strip, recording) = MockStrip::shared();
        let scheduler = Scheduler::new(strip).unwrap();

        scheduler.start(red_breathing()).unwrap();
        thread::sleep(Duration::from_millis(150));
        scheduler.start(green_breathing()).unwrap();
        thread::sleep(Duration::from_millis(150));
        scheduler.stop().unwrap();

        let fills = recording.fills();
        let last_red = fills.iter().rposition(|color| color.r == 255);
        let first_green = fills.iter().position(|color| color.g == 255);
        assert!(last_red.unwrap() < first_green.unwrap());
    }

    #[test]
    fn breathing_rides_the_wave_until_the_final_blank() {
        let (strip, recording) = MockStrip::shared();
        let scheduler = Scheduler::new(strip).unwrap();

        scheduler.start(red_breathing()).unwrap();
        thread::sleep(Duration::from_millis(600));
        scheduler.stop().unwrap();

        let events = recording.events();
        assert_eq!(events.last().unwrap().write, Write::Update);
        assert_eq!(
            events[events.len() - 2].write,
            Write::Fill(color::BLACK),
            "the very last fill must be the blanking write"
        );

        let fills = recording.fills();
        let wave = &fills[..fills.len() - 1];
        assert!(wave.len() >= 2);
        for color in wave {
            assert_eq!(color.r, 255);
            assert!(color.brightness >= 0.2 && color.brightness <= 1.0);
        }
        // 600 ms is well within the first rising flank of the wave.
        let steps = wave.len();
        assert!(wave[steps - 1].brightness > wave[steps - 2].brightness);
    }

    #[test]
    fn invalid_spec_leaves_the_running_animation_alone() {
        let (strip, recording) = MockStrip::shared();
        let scheduler = Scheduler::new(strip).unwrap();

        scheduler.start(red_breathing()).unwrap();
        thread::sleep(Duration::from_millis(100));

        let result = scheduler.start(AnimationSpec::Breathing {
            color: Color::new(0, 255, 0),
            min_brightness: 0.8,
            max_brightness: 0.2,
        });
        assert!(result.is_err());

        let count = recording.len();
        thread::sleep(Duration::from_millis(100));
        assert!(recording.len() > count);
        assert!(recording.fills().iter().all(|color| color.g == 0));
    }

    #[test]
    fn kill_stops_writes_without_blanking() {
        let (strip, recording) = MockStrip::shared();
        let scheduler = Scheduler::new(strip).unwrap();

        scheduler.start(red_breathing()).unwrap();
        thread::sleep(Duration::from_millis(100));
        scheduler.kill();
        thread::sleep(Duration::from_millis(100));

        let count = recording.len();
        thread::sleep(Duration::from_millis(150));
        assert_eq!(recording.len(), count);
        assert_eq!(recording.fills().last().unwrap().r, 255);
    }

    #[test]
    fn start_works_again_after_a_kill() {
        let (strip, recording) = MockStrip::shared();
        let scheduler = Scheduler::new(strip).unwrap();

        scheduler.start(red_breathing()).unwrap();
        scheduler.kill();
        scheduler.start(green_breathing()).unwrap();
        thread::sleep(Duration::from_millis(100));
        scheduler.stop().unwrap();

        assert!(recording.fills().iter().any(|color| color.g == 255));
    }

    #[test]
    fn start_returns_before_the_animation_finishes() {
        let (strip, _recording) = MockStrip::shared();
        let scheduler = Scheduler::new(strip).unwrap();

        let begin = Instant::now();
        scheduler.start(red_breathing()).unwrap();
        assert!(begin.elapsed() < Duration::from_secs(1));
        scheduler.stop().unwrap();
    }

    #[test]
    fn device_errors_surface_on_the_next_transition() {
        let strip = crate::lightstrip::SharedStrip::new(Box::new(FailingStrip));
        let scheduler = Scheduler::new(strip).unwrap();

        scheduler.start(red_breathing()).unwrap();
        thread::sleep(Duration::from_millis(100));

        // The animation already died on the flush error; the transition
        // still joins cleanly, but its own trailing write fails too.
        assert!(scheduler.stop().is_err());
        assert!(scheduler.start(green_breathing()).is_ok());
        scheduler.kill();
    }
}
