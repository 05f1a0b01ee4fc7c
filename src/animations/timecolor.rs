use std::time::Duration;

use chrono::{Local, Timelike};

use crate::animations::Animation;
use crate::color::Color;
use crate::fade;
use crate::lightstrip::SharedStrip;
use crate::scheduler::CancelToken;

const LEG_DURATION: Duration = Duration::from_secs(30);

/// Renders the wall clock as color: the hour maps to one hue, the minute
/// to another, and the strip sways between the two forever.
pub struct TimeColor;

fn hour_color(hour: u32) -> Color {
    Color::from_hue((hour * 15) as f32)
}

fn minute_color(minute: u32) -> Color {
    Color::from_hue((minute * 6) as f32)
}

impl Animation for TimeColor {
    fn name(&self) -> &'static str {
        "timecolor"
    }

    fn run(&mut self, strip: &SharedStrip, cancel: &CancelToken) -> Result<(), String> {
        while !cancel.is_set() {
            let now = Local::now();
            let hour = hour_color(now.hour());
            let minute = minute_color(now.minute());

            fade::run(strip, hour, minute, LEG_DURATION, cancel)?;
            fade::run(strip, minute, hour, LEG_DURATION, cancel)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_hues_cover_the_wheel_without_wrapping() {
        assert_eq!(hour_color(0), Color::from_hue(0.0));
        assert_eq!(hour_color(23), Color::from_hue(345.0));
        assert_eq!(minute_color(59), Color::from_hue(354.0));
    }

    #[test]
    fn noon_is_cyan() {
        // 12 * 15 = 180 degrees
        assert_eq!(hour_color(12), Color::new(0, 255, 255));
    }
}
