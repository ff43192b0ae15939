//! Time-window check for repaired clock readings.
//!
//! A screenshot clock shows `HH:MM` with no date, no seconds, and often no
//! AM/PM. A reading is accepted when, for some reference instant, it lies
//! within the tolerance on the previous, same or next calendar day, as read
//! or shifted by the meridiem offset either way.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};

use super::repair::is_clock_shape;

/// Wall-clock readings of `now` in each of the given UTC offsets.
pub fn reference_instants(now: DateTime<Utc>, offsets_minutes: &[i32]) -> Vec<NaiveDateTime> {
    let utc = now.naive_utc();
    offsets_minutes
        .iter()
        .filter_map(|&offset| utc.checked_add_signed(Duration::minutes(i64::from(offset))))
        .collect()
}

/// Parse `H:MM` / `HH:MM` into a time of day. Out-of-range values fail.
pub fn parse_clock(reading: &str) -> Option<NaiveTime> {
    if !is_clock_shape(reading) {
        return None;
    }
    let (hours, minutes) = reading.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Tolerance window around a set of reference instants.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    tolerance_minutes: i64,
    day_offsets: Vec<i64>,
    /// `None` when the configured shift is out of range; only the reading
    /// as parsed is compared then.
    meridiem_shift: Option<Duration>,
}

impl TimeWindow {
    pub fn new(tolerance_minutes: i64, day_offsets: Vec<i64>, meridiem_shift_hours: i64) -> Self {
        Self {
            tolerance_minutes,
            day_offsets,
            meridiem_shift: Duration::try_hours(meridiem_shift_hours),
        }
    }

    pub fn tolerance_minutes(&self) -> i64 {
        self.tolerance_minutes
    }

    /// True if `reading` is within tolerance of any reference.
    ///
    /// Differences are counted in whole minutes, truncated: against a
    /// reference of 14:05:40, a reading of 14:00 is 5 minutes away.
    pub fn is_within_window(&self, reading: &str, references: &[NaiveDateTime]) -> bool {
        let Some(time) = parse_clock(reading) else {
            return false;
        };
        references
            .iter()
            .any(|reference| self.matches_reference(time, *reference))
    }

    fn matches_reference(&self, time: NaiveTime, reference: NaiveDateTime) -> bool {
        let same_day = reference.date().and_time(time);
        let mut shifts = vec![Duration::zero()];
        if let Some(shift) = self.meridiem_shift {
            shifts.extend([shift, -shift]);
        }

        self.day_offsets.iter().any(|&offset| {
            let Some(comparison) = Duration::try_days(offset).and_then(|d| same_day.checked_add_signed(d))
            else {
                return false;
            };
            shifts.iter().any(|&shift| {
                comparison
                    .checked_add_signed(shift)
                    .map(|variant| (reference - variant).num_minutes().abs() <= self.tolerance_minutes)
                    .unwrap_or(false)
            })
        })
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::new(5, vec![-1, 0, 1], 12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn five_minutes_is_inclusive() {
        let window = TimeWindow::default();
        assert!(window.is_within_window("14:00", &[at(17, 14, 5, 0)]));
        assert!(!window.is_within_window("14:00", &[at(17, 14, 6, 0)]));
        assert!(window.is_within_window("14:00", &[at(17, 13, 55, 0)]));
        assert!(!window.is_within_window("14:00", &[at(17, 13, 54, 0)]));
    }

    #[test]
    fn seconds_are_truncated() {
        let window = TimeWindow::default();
        assert!(window.is_within_window("14:00", &[at(17, 14, 5, 59)]));
    }

    #[test]
    fn midnight_rollover() {
        let window = TimeWindow::default();
        assert!(window.is_within_window("23:58", &[at(18, 0, 2, 0)]));
        assert!(window.is_within_window("00:01", &[at(17, 23, 59, 0)]));
    }

    #[test]
    fn twelve_hour_ambiguity() {
        let window = TimeWindow::default();
        assert!(window.is_within_window("02:15", &[at(17, 14, 15, 0)]));
        assert!(window.is_within_window("2:15", &[at(17, 14, 15, 0)]));
        assert!(window.is_within_window("14:15", &[at(17, 2, 13, 0)]));
    }

    #[test]
    fn any_reference_may_match() {
        let window = TimeWindow::default();
        let refs = [at(17, 9, 0, 0), at(17, 14, 30, 0)];
        assert!(window.is_within_window("14:27", &refs));
        assert!(!window.is_within_window("11:00", &refs));
    }

    #[test]
    fn invalid_readings_never_match() {
        let window = TimeWindow::default();
        let refs = [at(17, 14, 0, 0)];
        assert!(!window.is_within_window("24:00", &refs));
        assert!(!window.is_within_window("14:60", &refs));
        assert!(!window.is_within_window("14.00", &refs));
        assert!(!window.is_within_window("14:00", &[]));
    }

    #[test]
    fn without_rollover_offsets_midnight_fails() {
        let window = TimeWindow::new(5, vec![0], 12);
        assert!(!window.is_within_window("23:58", &[at(18, 0, 2, 0)]));
    }

    #[test]
    fn out_of_range_offsets_are_skipped() {
        let window = TimeWindow::new(5, vec![i64::MAX, 0], i64::MAX);
        assert!(window.is_within_window("14:00", &[at(17, 14, 3, 0)]));
        assert!(!window.is_within_window("02:00", &[at(17, 14, 0, 0)]));
        assert!(!window.is_within_window("14:00", &[at(17, 20, 0, 0)]));
    }

    #[test]
    fn references_cover_each_offset() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap();
        let refs = reference_instants(now, &[0, 330]);
        assert_eq!(refs, vec![at(17, 9, 0, 0), at(17, 14, 30, 0)]);
    }

    #[test]
    fn parse_clock_ranges() {
        assert_eq!(parse_clock("9:05"), NaiveTime::from_hms_opt(9, 5, 0));
        assert_eq!(parse_clock("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
        assert_eq!(parse_clock("7:5"), None);
        assert_eq!(parse_clock("+1:05"), None);
    }
}
