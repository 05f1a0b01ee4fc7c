use std::f64::consts::{FRAC_PI_2, PI, TAU};

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime};

// Apparent solar diameter and refraction at the horizon, in degrees.
const SUN_RADIUS: f64 = 0.53;
const ATMOSPHERIC_REFRACTION: f64 = 34.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
}

/// Local sunrise and sunset for a date and position, from a low-precision
/// solar ephemeris: Julian day since J2000, mean solar longitude and
/// anomaly, equation of time, and the hour angle corrected for solar
/// radius and refraction. Good to a few minutes, which is plenty for
/// waking someone up.
pub fn sunrise_sunset(
    latitude: f64,
    longitude: f64,
    utc_offset: f64,
    date: NaiveDate,
    hour: u32,
    is_dst: bool,
) -> Result<SunTimes, String> {
    let julian = julian_day(date, hour);

    let mean_longitude = normalize_radians(280.461_f64.to_radians() + 0.9856474_f64.to_radians() * julian);
    let mean_anomaly = normalize_radians(357.528_f64.to_radians() + 0.9856003_f64.to_radians() * julian);
    let ecliptic_longitude = normalize_radians(
        mean_longitude
            + 1.915_f64.to_radians() * mean_anomaly.sin()
            + 0.02_f64.to_radians() * (2.0 * mean_anomaly).sin(),
    );

    let oblique = 23.439_f64.to_radians() - 0.0000004_f64.to_radians() * julian;
    let right_ascension = (oblique.cos() * ecliptic_longitude.sin()).atan2(ecliptic_longitude.cos());
    let declination = (oblique.sin() * ecliptic_longitude.sin()).asin();

    let mut apparent_longitude = mean_longitude - right_ascension;
    if mean_longitude < PI {
        apparent_longitude += TAU;
    }
    let equation_of_time = 1440.0 * (1.0 - apparent_longitude / TAU);

    let angle = hour_angle(latitude, declination);
    let rise = 12.0 - 12.0 * angle / PI + utc_offset - longitude / 15.0 + equation_of_time / 60.0;
    let set = 12.0 + 12.0 * angle / PI + utc_offset - longitude / 15.0 + equation_of_time / 60.0;

    let dst_shift = i64::from(is_dst);
    Ok(SunTimes {
        sunrise: clock_time(rise, dst_shift)?,
        sunset: clock_time(set, dst_shift)?,
    })
}

/// Resolves a local time of day to the next instant it occurs, today or
/// tomorrow.
pub fn upcoming(time: NaiveTime) -> Option<DateTime<Local>> {
    upcoming_from(Local::now(), time)
}

fn upcoming_from(now: DateTime<Local>, time: NaiveTime) -> Option<DateTime<Local>> {
    let mut date = now.date_naive();
    if time <= now.time() {
        date = date.succ_opt()?;
    }

    date.and_time(time).and_local_timezone(Local).earliest()
}

/// Days since the J2000.0 epoch. Integer parts use floor division to
/// match the usual almanac formulation.
fn julian_day(date: NaiveDate, hour: u32) -> f64 {
    let year = i64::from(date.year());
    let month = i64::from(date.month());
    let day = i64::from(date.day());

    let whole_days = (-7 * (year + (month + 9) / 12)).div_euclid(4)
        + (275 * month).div_euclid(9)
        + day
        + year * 367;
    whole_days as f64 - 730531.5 + f64::from(hour) / 24.0
}

/// Forces an angle into [0, 2pi).
fn normalize_radians(x: f64) -> f64 {
    let turns = x / TAU;
    let mut angle = TAU * (turns - turns.trunc());
    if angle < 0.0 {
        angle += TAU;
    }

    angle
}

/// Half the arc the sun travels above the horizon, seen from the given
/// latitude. Saturates towards polar day.
fn hour_angle(latitude: f64, declination: f64) -> f64 {
    let mut horizon_dip = (0.5 * SUN_RADIUS + ATMOSPHERIC_REFRACTION).to_radians();
    if latitude < 0.0 {
        horizon_dip = -horizon_dip;
    }

    let mut fraction = (declination + horizon_dip).tan() * latitude.to_radians().tan();
    if fraction > 0.999999 {
        fraction = 1.0;
    }

    fraction.asin() + FRAC_PI_2
}

fn clock_time(hours: f64, dst_shift: i64) -> Result<NaiveTime, String> {
    let hour = (hours.trunc() as i64 + dst_shift).rem_euclid(24);
    let minute = (((hours - hours.trunc()) * 60.0) as i64).rem_euclid(60);

    NaiveTime::from_hms_opt(hour as u32, minute as u32, 0)
        .ok_or_else(|| format!("Sun time out of range: {}", hours))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Timelike;

    use super::*;

    #[test]
    fn equator_sunrise_lands_near_six() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let times = sunrise_sunset(0.0, 0.0, 0.0, date, 6, false).unwrap();

        // Only the equation of time moves this away from 06:00/18:00.
        assert!((5..=6).contains(&times.sunrise.hour()));
        assert!((17..=18).contains(&times.sunset.hour()));
        assert!(times.sunrise < times.sunset);
    }

    #[test]
    fn dst_shifts_both_times_by_one_hour() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let plain = sunrise_sunset(47.6097, -122.3331, -8.0, date, 7, false).unwrap();
        let shifted = sunrise_sunset(47.6097, -122.3331, -8.0, date, 7, true).unwrap();

        assert_eq!(shifted.sunrise.hour(), (plain.sunrise.hour() + 1) % 24);
        assert_eq!(shifted.sunrise.minute(), plain.sunrise.minute());
        assert_eq!(shifted.sunset.hour(), (plain.sunset.hour() + 1) % 24);
        assert_eq!(shifted.sunset.minute(), plain.sunset.minute());
    }

    #[test]
    fn summer_days_are_longer_up_north() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let north = sunrise_sunset(60.0, 0.0, 0.0, date, 12, false).unwrap();
        let equator = sunrise_sunset(0.0, 0.0, 0.0, date, 12, false).unwrap();

        let north_len = north.sunset.signed_duration_since(north.sunrise);
        let equator_len = equator.sunset.signed_duration_since(equator.sunrise);
        assert!(north_len > equator_len);
    }

    #[test]
    fn upcoming_rolls_over_to_tomorrow() {
        let now = Local.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();

        let later = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        let earlier = NaiveTime::from_hms_opt(6, 0, 0).unwrap();

        let today = upcoming_from(now, later).unwrap();
        assert_eq!(today.date_naive(), now.date_naive());

        let tomorrow = upcoming_from(now, earlier).unwrap();
        assert_eq!(tomorrow.date_naive(), now.date_naive().succ_opt().unwrap());
        assert!(tomorrow > now);
    }
}
