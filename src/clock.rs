//! Wall-clock tracking for the tick loop.
//!
//! Unlike a bare step counter, [`Clock`] carries an actual calendar date so output
//! rows can be timestamped `YYYY-MM-DD HH:MM` and a tick that wraps past midnight
//! rolls the date forward.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::InputError;

/// Tracks a `NaiveDateTime` that advances as the input table's `Tiempo` column is read.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use ev_fleet_scheduler::clock::Clock;
///
/// let mut clock = Clock::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
/// clock.set_hh_mm(0, "9:00").unwrap();
/// assert_eq!(clock.format_current(), "2024-01-01 09:00");
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    current: Option<NaiveDateTime>,
    date: NaiveDate,
}

impl Clock {
    /// Creates a clock starting on the given calendar date with no time set yet.
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            current: None,
            date: start_date,
        }
    }

    /// Parses `"H:MM"` or `"HH:MM"` and advances the clock to that time on the current
    /// calendar day, rolling the day forward if the new time is `00:00` and strictly
    /// earlier in the clock than the previous reading.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::BadTimeFormat`] if `s` does not parse.
    pub fn set_hh_mm(&mut self, row: usize, s: &str) -> Result<(), InputError> {
        let (h, m) = parse_hh_mm(s).ok_or_else(|| InputError::BadTimeFormat {
            row,
            value: s.to_string(),
        })?;

        let candidate_time = chrono::NaiveTime::from_hms_opt(h as u32, m as u32, 0).ok_or_else(|| {
            InputError::BadTimeFormat {
                row,
                value: s.to_string(),
            }
        })?;

        let midnight = chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        if let Some(prev) = self.current
            && candidate_time == midnight
            && prev.time() != midnight
        {
            self.date += Duration::days(1);
        }

        self.current = Some(NaiveDateTime::new(self.date, candidate_time));
        Ok(())
    }

    /// Current timestamp, or `None` before the first [`Clock::set_hh_mm`] call.
    pub fn current(&self) -> Option<NaiveDateTime> {
        self.current
    }

    /// Formats the current timestamp as `YYYY-MM-DD HH:MM`, or an empty string if unset.
    pub fn format_current(&self) -> String {
        match self.current {
            Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            None => String::new(),
        }
    }
}

fn parse_hh_mm(s: &str) -> Option<(u8, u8)> {
    let s = s.trim();
    let (h, m) = s.split_once(':')?;
    let h: u8 = h.trim().parse().ok()?;
    let m: u8 = m.trim().parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some((h, m))
}
