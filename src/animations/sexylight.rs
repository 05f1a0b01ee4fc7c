use std::time::Duration;

use rand::Rng;

use crate::animations::breathing::{BreathingWave, TICK_RATE_HZ};
use crate::animations::Animation;
use crate::color::Color;
use crate::fade;
use crate::intervaltimer::IntervalTimer;
use crate::lightstrip::SharedStrip;
use crate::scheduler::CancelToken;

const HUE_FADE: Duration = Duration::from_secs(3);

/// Breathing with a wandering hue: every time the wave bottoms out, the
/// base color glides to a new random hue in the warm magenta-to-yellow
/// band before the next breath starts.
pub struct SexyLight {
    base_color: Color,
    wave: BreathingWave,
}

impl SexyLight {
    pub fn new(min_brightness: f32, max_brightness: f32) -> SexyLight {
        SexyLight {
            base_color: Color::from_hue(random_warm_hue()),
            wave: BreathingWave::new(min_brightness, max_brightness),
        }
    }
}

/// Hue offset sampled in [-60, 45] degrees around zero, normalized into
/// [0, 360). Keeps the colors between magenta and yellow.
fn random_warm_hue() -> f32 {
    let offset = rand::thread_rng().gen_range(-60..=45);
    ((offset + 360) % 360) as f32
}

impl Animation for SexyLight {
    fn name(&self) -> &'static str {
        "sexylight"
    }

    fn run(&mut self, strip: &SharedStrip, cancel: &CancelToken) -> Result<(), String> {
        let mut timer = IntervalTimer::new(TICK_RATE_HZ);

        while !cancel.is_set() {
            strip.fill(self.base_color.with_brightness(self.wave.brightness()));
            strip.update()?;
            self.wave.advance();

            if self.wave.at_low_end() {
                let brightness = self.wave.brightness();
                let next_color = Color::from_hue(random_warm_hue());
                fade::run(
                    strip,
                    self.base_color.with_brightness(brightness),
                    next_color.with_brightness(brightness),
                    HUE_FADE,
                    cancel,
                )?;
                self.base_color = next_color;
            }

            timer.sleep_until_next_tick();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hues_stay_in_the_warm_band() {
        for _ in 0..200 {
            let hue = random_warm_hue();
            assert!((0.0..=45.0).contains(&hue) || (300.0..360.0).contains(&hue));
        }
    }
}
