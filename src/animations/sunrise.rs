use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local, Timelike};

use crate::animations::{Animation, AnimationSpec};
use crate::color::{self, Color};
use crate::fade;
use crate::lightstrip::SharedStrip;
use crate::scheduler::{CancelToken, POLL_INTERVAL};
use crate::settings::Settings;
use crate::suncalc;

const SUN_COLOR: Color = Color {
    r: 255,
    g: 210,
    b: 80,
    brightness: 1.0,
};
const DAYLIGHT: Color = Color {
    r: 255,
    g: 255,
    b: 255,
    brightness: 1.0,
};

/// Simulated sunrise: stay dark, start a warm ramp shortly before the sun
/// actually rises, brighten to full daylight, then switch off again. The
/// wait is a poll so cancellation stays responsive over the hours before
/// dawn.
pub struct Sunrise {
    sunrise: DateTime<Local>,
    lead: Duration,
    ramp: Duration,
    hold: Duration,
}

impl Sunrise {
    pub fn new(sunrise: DateTime<Local>, lead: Duration, ramp: Duration, hold: Duration) -> Sunrise {
        Sunrise {
            sunrise,
            lead,
            ramp,
            hold,
        }
    }

    fn sun_is_near(&self) -> bool {
        let until = self.sunrise.signed_duration_since(Local::now());
        until.num_milliseconds() <= self.lead.as_millis() as i64
    }
}

/// Builds the sunrise spec for the configured location from today's
/// astronomical sunrise, rolling over to tomorrow once it has passed.
pub fn from_settings(settings: &Settings) -> Result<AnimationSpec, String> {
    let location = &settings.location;
    let now = Local::now();
    let times = suncalc::sunrise_sunset(
        location.latitude,
        location.longitude,
        location.utc_offset,
        now.date_naive(),
        now.hour(),
        location.is_dst,
    )?;

    log::info!("Sun times: rise {}, set {}", times.sunrise, times.sunset);
    let sunrise = suncalc::upcoming(times.sunrise)
        .ok_or_else(|| "Cannot resolve the sunrise to a local instant".to_string())?;

    Ok(spec_for(sunrise, settings))
}

/// Same ramp, driven by an alarm time instead of the sun.
pub fn spec_for(sunrise: DateTime<Local>, settings: &Settings) -> AnimationSpec {
    let light = &settings.light;
    AnimationSpec::Sunrise {
        sunrise,
        lead: Duration::from_secs(light.sunrise_lead_minutes * 60),
        ramp: Duration::from_secs(light.sunrise_ramp_minutes * 60),
        hold: Duration::from_secs(light.sunrise_hold_minutes * 60),
    }
}

impl Animation for Sunrise {
    fn name(&self) -> &'static str {
        "sunrise"
    }

    fn run(&mut self, strip: &SharedStrip, cancel: &CancelToken) -> Result<(), String> {
        strip.fill(color::BLACK);
        strip.update()?;

        while !self.sun_is_near() {
            if cancel.is_set() {
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL);
        }
        if cancel.is_set() {
            return Ok(());
        }

        log::info!("Sunrise ramp starting");
        fade::run(strip, color::BLACK, SUN_COLOR, self.ramp, cancel)?;
        fade::run(strip, SUN_COLOR, DAYLIGHT, self.hold, cancel)?;

        if cancel.is_set() {
            return Ok(());
        }
        strip.fill(color::BLACK);
        strip.update()?;

        // The sun is up; keep the slot occupied but dark until replaced.
        while !cancel.is_set() {
            thread::sleep(POLL_INTERVAL);
        }

        Ok(())
    }
}
