use std::time::Duration;

use rand::Rng;

use crate::animations::Animation;
use crate::color::Color;
use crate::fade;
use crate::lightstrip::SharedStrip;
use crate::scheduler::CancelToken;

/// Endless drift through random colors: fade to a fresh random color,
/// arrive, pick the next one. Channels are sampled away from zero so the
/// strip never goes fully dark in between.
pub struct RandomFade {
    current: Color,
    leg_duration: Duration,
}

impl RandomFade {
    pub fn new(from: Color, leg_duration: Duration) -> RandomFade {
        RandomFade {
            current: from,
            leg_duration,
        }
    }
}

fn random_color() -> Color {
    let mut rng = rand::thread_rng();
    Color::new(
        rng.gen_range(32..=255u8),
        rng.gen_range(32..=255u8),
        rng.gen_range(32..=255u8),
    )
}

impl Animation for RandomFade {
    fn name(&self) -> &'static str {
        "randomfade"
    }

    fn run(&mut self, strip: &SharedStrip, cancel: &CancelToken) -> Result<(), String> {
        while !cancel.is_set() {
            let next = random_color();
            fade::run(strip, self.current, next, self.leg_duration, cancel)?;
            self.current = next;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_colors_avoid_the_dark_corner() {
        for _ in 0..100 {
            let color = random_color();
            assert!(color.r >= 32 && color.g >= 32 && color.b >= 32);
        }
    }
}
