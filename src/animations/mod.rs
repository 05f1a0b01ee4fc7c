pub(crate) mod breathing;
pub(crate) mod randomfade;
pub(crate) mod sexylight;
pub(crate) mod sunrise;
pub(crate) mod timecolor;

use std::time::Duration;

use chrono::{DateTime, Local};

use crate::color::Color;
use crate::lightstrip::SharedStrip;
use crate::scheduler::CancelToken;

/// A unit of light work. Runs its effect loop until the token is set and
/// must return promptly afterwards, within one frame. Device flush errors
/// end the run.
pub trait Animation: Send {
    fn name(&self) -> &'static str;
    fn run(&mut self, strip: &SharedStrip, cancel: &CancelToken) -> Result<(), String>;
}

/// Which animation to run, plus its parameters. Built by a command
/// surface, validated and consumed by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationSpec {
    RandomFade {
        from: Color,
        leg_duration: Duration,
    },
    Breathing {
        color: Color,
        min_brightness: f32,
        max_brightness: f32,
    },
    SexyLight {
        min_brightness: f32,
        max_brightness: f32,
    },
    TimeColor,
    Sunrise {
        sunrise: DateTime<Local>,
        lead: Duration,
        ramp: Duration,
        hold: Duration,
    },
}

impl AnimationSpec {
    /// Rejects parameters outside their domain before any scheduler
    /// transition happens.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            AnimationSpec::RandomFade { leg_duration, .. } => {
                if leg_duration.is_zero() {
                    return Err("Fade duration must be positive".to_string());
                }
            }
            AnimationSpec::Breathing {
                min_brightness,
                max_brightness,
                ..
            }
            | AnimationSpec::SexyLight {
                min_brightness,
                max_brightness,
            } => {
                check_brightness_range(*min_brightness, *max_brightness)?;
            }
            AnimationSpec::TimeColor | AnimationSpec::Sunrise { .. } => {}
        }

        Ok(())
    }

    pub fn into_animation(self) -> Box<dyn Animation> {
        match self {
            AnimationSpec::RandomFade { from, leg_duration } => {
                Box::new(randomfade::RandomFade::new(from, leg_duration))
            }
            AnimationSpec::Breathing {
                color,
                min_brightness,
                max_brightness,
            } => Box::new(breathing::Breathing::new(
                color,
                min_brightness,
                max_brightness,
            )),
            AnimationSpec::SexyLight {
                min_brightness,
                max_brightness,
            } => Box::new(sexylight::SexyLight::new(min_brightness, max_brightness)),
            AnimationSpec::TimeColor => Box::new(timecolor::TimeColor),
            AnimationSpec::Sunrise {
                sunrise,
                lead,
                ramp,
                hold,
            } => Box::new(sunrise::Sunrise::new(sunrise, lead, ramp, hold)),
        }
    }
}

fn check_brightness_range(min: f32, max: f32) -> Result<(), String> {
    if !min.is_finite() || !max.is_finite() {
        return Err("Brightness bounds must be finite".to_string());
    }
    if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) {
        return Err("Brightness bounds must lie within 0.0 and 1.0".to_string());
    }
    if min > max {
        return Err("Minimum brightness exceeds maximum brightness".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breathing_bounds_are_checked() {
        let bad = [(-0.1, 0.5), (0.2, 1.5), (0.8, 0.2), (f32::NAN, 1.0)];
        for (min, max) in bad {
            let spec = AnimationSpec::Breathing {
                color: Color::new(255, 0, 0),
                min_brightness: min,
                max_brightness: max,
            };
            assert!(spec.validate().is_err(), "accepted {}..{}", min, max);
        }

        let spec = AnimationSpec::SexyLight {
            min_brightness: 0.3,
            max_brightness: 1.0,
        };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn zero_fade_legs_are_rejected() {
        let spec = AnimationSpec::RandomFade {
            from: Color::new(255, 0, 0),
            leg_duration: Duration::ZERO,
        };
        assert!(spec.validate().is_err());
    }
}
