//! Activity window: the weekdays and daily time range during which mail
//! may be sent.
//!
//! Both window bounds are inclusive at minute granularity, so a window with
//! equal start and stop times is open for exactly one minute.

use crate::config::ConfigSnapshot;
use chrono::{DateTime, Datelike, Local, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// A wall-clock time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    /// Creates a time of day, or `None` if out of range.
    #[must_use]
    pub const fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Hour, 0-23.
    #[must_use]
    pub const fn hour(self) -> u32 {
        self.hour
    }

    /// Minute, 0-59.
    #[must_use]
    pub const fn minute(self) -> u32 {
        self.minute
    }

    /// True if `hour:minute` is at or after this time.
    #[must_use]
    pub const fn is_reached_by(self, hour: u32, minute: u32) -> bool {
        (hour == self.hour && minute >= self.minute) || hour > self.hour
    }

    /// True if `hour:minute` is at or before this time.
    #[must_use]
    pub const fn is_not_passed_by(self, hour: u32, minute: u32) -> bool {
        (hour == self.hour && minute <= self.minute) || hour < self.hour
    }
}

impl FromStr for TimeOfDay {
    type Err = chrono::ParseError;

    /// Parses `HH:MM` in 24-hour form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = NaiveTime::parse_from_str(s.trim(), "%H:%M")?;
        Ok(Self {
            hour: time.hour(),
            minute: time.minute(),
        })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Weekday identifier used in the configured day set (1 = Sunday ... 7 = Saturday).
#[must_use]
pub fn weekday_id(weekday: Weekday) -> u32 {
    weekday.number_from_sunday()
}

/// Decides whether `at` falls inside the configured window, in local time.
#[must_use]
pub fn is_active(config: &ConfigSnapshot, at: DateTime<Utc>) -> bool {
    is_active_in(config, at, &Local)
}

/// Decides whether `at` falls inside the configured window, evaluated in `tz`.
///
/// Incomplete configuration, an unlisted weekday and unparseable bounds all
/// yield `false`.
#[must_use]
pub fn is_active_in<Tz: TimeZone>(config: &ConfigSnapshot, at: DateTime<Utc>, tz: &Tz) -> bool {
    if !config.has_all_required() {
        return false;
    }

    let local = at.with_timezone(tz);
    let day = weekday_id(local.weekday());
    if !config.active_days.contains(&day) {
        debug!(day, "Day of week is not active");
        return false;
    }

    let (hour, minute) = (local.hour(), local.minute());

    let Some(start) = parse_bound("start_time", &config.start_time) else {
        return false;
    };
    if !start.is_reached_by(hour, minute) {
        debug!(%start, "Before start time");
        return false;
    }

    let Some(stop) = parse_bound("stop_time", &config.stop_time) else {
        return false;
    };
    if !stop.is_not_passed_by(hour, minute) {
        debug!(%stop, "After stop time");
        return false;
    }

    true
}

fn parse_bound(field: &'static str, value: &str) -> Option<TimeOfDay> {
    match value.parse() {
        Ok(time) => Some(time),
        Err(e) => {
            warn!(field, value, "Invalid time: {e}");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Preferences;
    use crate::config::fixtures::{REQUIRED, complete_preferences, without};
    use chrono::FixedOffset;
    use proptest::prelude::*;

    /// 2024-01-07 is a Sunday.
    fn sunday(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 7, hour, minute, second).unwrap()
    }

    fn window(start: &str, stop: &str) -> ConfigSnapshot {
        ConfigSnapshot::capture(&Preferences {
            start_time: start.into(),
            stop_time: stop.into(),
            ..complete_preferences()
        })
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!("07:05".parse::<TimeOfDay>().unwrap(), TimeOfDay::new(7, 5).unwrap());
        assert_eq!("23:59".parse::<TimeOfDay>().unwrap().to_string(), "23:59");
        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("noon".parse::<TimeOfDay>().is_err());
        assert!("".parse::<TimeOfDay>().is_err());
        assert!(TimeOfDay::new(12, 60).is_none());
    }

    #[test]
    fn test_weekday_ids_start_on_sunday() {
        assert_eq!(weekday_id(Weekday::Sun), 1);
        assert_eq!(weekday_id(Weekday::Mon), 2);
        assert_eq!(weekday_id(Weekday::Sat), 7);
    }

    #[test]
    fn test_degenerate_window_is_one_minute() {
        let config = window("13:00", "13:00");
        assert!(!is_active_in(&config, sunday(12, 59, 59), &Utc));
        assert!(is_active_in(&config, sunday(13, 0, 0), &Utc));
        assert!(is_active_in(&config, sunday(13, 0, 59), &Utc));
        assert!(!is_active_in(&config, sunday(13, 1, 0), &Utc));
    }

    #[test]
    fn test_day_set_enforced() {
        let mut prefs = complete_preferences();
        prefs.days.remove(&1);
        let config = ConfigSnapshot::capture(&prefs);
        assert!(!is_active_in(&config, sunday(12, 0, 0), &Utc));

        prefs.days.clear();
        let config = ConfigSnapshot::capture(&prefs);
        assert!(!is_active_in(&config, sunday(12, 0, 0), &Utc));

        prefs.days.insert(1);
        let config = ConfigSnapshot::capture(&prefs);
        assert!(is_active_in(&config, sunday(12, 0, 0), &Utc));
    }

    #[test]
    fn test_weekday_follows_time_zone() {
        let mut prefs = complete_preferences();
        prefs.days = [1].into();
        let config = ConfigSnapshot::capture(&prefs);
        // Sunday 23:30 UTC is already Monday in UTC+2.
        let at = sunday(23, 30, 0);
        assert!(is_active_in(&config, at, &Utc));
        assert!(!is_active_in(&config, at, &FixedOffset::east_opt(2 * 3600).unwrap()));
    }

    #[test]
    fn test_incomplete_configuration_is_never_active() {
        for field in REQUIRED {
            let config = ConfigSnapshot::capture(&without(field));
            for hour in [0, 6, 12, 18, 23] {
                assert!(!is_active_in(&config, sunday(hour, 30, 0), &Utc), "{field}");
            }
        }
    }

    #[test]
    fn test_unparseable_bounds_fail_closed() {
        assert!(!is_active_in(&window("8am", "23:00"), sunday(12, 0, 0), &Utc));
        assert!(!is_active_in(&window("08:00", "late"), sunday(12, 0, 0), &Utc));
    }

    proptest! {
        #[test]
        fn start_minute_is_inclusive(hour in 0u32..24, minute in 1u32..60, second in 0u32..60) {
            let start = format!("{hour:02}:{minute:02}");
            let config = window(&start, "23:59");
            prop_assert!(is_active_in(&config, sunday(hour, minute, second), &Utc));
            prop_assert!(!is_active_in(&config, sunday(hour, minute - 1, 59), &Utc));
        }

        #[test]
        fn stop_minute_is_inclusive(hour in 0u32..24, minute in 0u32..59, second in 0u32..60) {
            let stop = format!("{hour:02}:{minute:02}");
            let config = window("00:00", &stop);
            prop_assert!(is_active_in(&config, sunday(hour, minute, second), &Utc));
            prop_assert!(!is_active_in(&config, sunday(hour, minute + 1, 0), &Utc));
        }

        #[test]
        fn window_matches_minute_comparison(
            start in (0u32..24, 0u32..60),
            stop in (0u32..24, 0u32..60),
            at in (0u32..24, 0u32..60, 0u32..60),
        ) {
            let config = window(
                &format!("{:02}:{:02}", start.0, start.1),
                &format!("{:02}:{:02}", stop.0, stop.1),
            );
            let now = (at.0, at.1);
            let expected = start <= now && now <= stop;
            prop_assert_eq!(is_active_in(&config, sunday(at.0, at.1, at.2), &Utc), expected);
        }
    }
}
