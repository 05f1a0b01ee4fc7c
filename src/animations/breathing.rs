use crate::animations::Animation;
use crate::color::Color;
use crate::intervaltimer::IntervalTimer;
use crate::lightstrip::SharedStrip;
use crate::scheduler::CancelToken;

pub(crate) const TICK_RATE_HZ: f32 = 100.0;

/// Triangular brightness wave: a step counter walks between 0 and 255 and
/// reflects at both ends, giving a full period of 510 steps. Brightness at
/// step s is min + (max - min) * s / 255.
pub struct BreathingWave {
    step: i16,
    direction: i16,
    min_brightness: f32,
    max_brightness: f32,
}

impl BreathingWave {
    pub fn new(min_brightness: f32, max_brightness: f32) -> BreathingWave {
        BreathingWave {
            step: 0,
            direction: 1,
            min_brightness,
            max_brightness,
        }
    }

    pub fn brightness(&self) -> f32 {
        self.min_brightness
            + (self.max_brightness - self.min_brightness) * (f32::from(self.step) / 255.0)
    }

    pub fn advance(&mut self) {
        self.step += self.direction;
        if self.step == 0 || self.step == 255 {
            self.direction = -self.direction;
        }
    }

    /// True right after the wave has reflected at its dim end.
    pub fn at_low_end(&self) -> bool {
        self.step == 0
    }
}

pub struct Breathing {
    base_color: Color,
    wave: BreathingWave,
}

impl Breathing {
    pub fn new(base_color: Color, min_brightness: f32, max_brightness: f32) -> Breathing {
        Breathing {
            base_color,
            wave: BreathingWave::new(min_brightness, max_brightness),
        }
    }
}

impl Animation for Breathing {
    fn name(&self) -> &'static str {
        "breathing"
    }

    fn run(&mut self, strip: &SharedStrip, cancel: &CancelToken) -> Result<(), String> {
        let mut timer = IntervalTimer::new(TICK_RATE_HZ);

        while !cancel.is_set() {
            strip.fill(self.base_color.with_brightness(self.wave.brightness()));
            strip.update()?;
            self.wave.advance();
            timer.sleep_until_next_tick();
        }

        Ok(())
    }
}
