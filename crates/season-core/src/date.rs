//! Calendar days stored as a single integer count of days since 1970-01-01.
//!
//! All arithmetic happens on the integer. Conversion to civil `(year, month,
//! day)` values or `YYYY-MM-DD` text only happens at the edges, so there is no
//! time-of-day or timezone component that could shift a date by one.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use chrono::Weekday;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Errors raised when building a date from external input.
#[derive(Debug, Error, PartialEq)]
pub enum DateError {
    /// Text was not in `YYYY-MM-DD` form.
    #[error("malformed date {0:?}, expected YYYY-MM-DD")]
    Malformed(String),
    /// Month/day combination does not exist in that year.
    #[error("no such calendar day {year}-{month:02}-{day:02}")]
    NoSuchDay { year: i32, month: u32, day: u32 },
}

/// A UTC-normalized calendar day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(i32);

impl CalendarDate {
    /// 1970-01-01.
    pub const EPOCH: CalendarDate = CalendarDate(0);

    pub const fn from_days(days_since_epoch: i32) -> Self {
        CalendarDate(days_since_epoch)
    }

    pub const fn days(self) -> i32 {
        self.0
    }

    /// Strict constructor: rejects days that do not exist (e.g. Feb 30).
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from_naive)
            .ok_or(DateError::NoSuchDay { year, month, day })
    }

    /// Total constructor for fixed anchors. Day overflow rolls forward into
    /// the next month (Feb 30 becomes Mar 1 or 2); month is clamped to 1..=12.
    /// Years outside chrono's range saturate to its first or last day.
    pub fn from_civil(year: i32, month: u32, day: u32) -> Self {
        NaiveDate::from_ymd_opt(year, month.clamp(1, 12), 1)
            .and_then(|first| {
                first.checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
            })
            .map_or_else(
                || Self::from_naive(if year < 0 { NaiveDate::MIN } else { NaiveDate::MAX }),
                Self::from_naive,
            )
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        CalendarDate(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
    }

    /// Interop with chrono; `None` only outside chrono's supported range.
    pub fn to_naive(self) -> Option<NaiveDate> {
        self.0
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
    }

    /// Like [`to_naive`](Self::to_naive), saturating at chrono's range.
    fn naive(self) -> NaiveDate {
        self.to_naive().unwrap_or(if self.0 < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
    }

    /// Civil `(year, month, day)`.
    pub fn ymd(self) -> (i32, u32, u32) {
        let date = self.naive();
        (date.year(), date.month(), date.day())
    }

    pub fn year(self) -> i32 {
        self.ymd().0
    }

    pub fn add_days(self, days: i32) -> Self {
        CalendarDate(self.0.saturating_add(days))
    }

    /// Day of week with 0 = Sunday .. 6 = Saturday.
    pub fn day_of_week(self) -> u8 {
        // 1970-01-01 was a Thursday.
        (i64::from(self.0) + 4).rem_euclid(7) as u8
    }

    pub fn weekday(self) -> Weekday {
        match self.day_of_week() {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            _ => Weekday::Sat,
        }
    }

    /// Signed number of days from `other` to `self`.
    pub fn diff_days(self, other: CalendarDate) -> i32 {
        self.0 - other.0
    }

    pub fn is_before(self, other: CalendarDate) -> bool {
        self < other
    }

    pub fn is_after(self, other: CalendarDate) -> bool {
        self > other
    }

    pub fn is_same(self, other: CalendarDate) -> bool {
        self == other
    }

    /// First date on or after `self` that falls on `weekday`.
    pub fn next_weekday_on_or_after(self, weekday: Weekday) -> Self {
        let target = weekday.num_days_from_sunday() as i32;
        let delta = (target - i32::from(self.day_of_week())).rem_euclid(7);
        self.add_days(delta)
    }

    /// Every day from `start` through `end`, inclusive. Empty when `end < start`.
    pub fn range_inclusive(
        start: CalendarDate,
        end: CalendarDate,
    ) -> impl Iterator<Item = CalendarDate> {
        (start.0..=end.0).map(CalendarDate)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // NaiveDate displays as YYYY-MM-DD.
        fmt::Display::fmt(&self.naive(), f)
    }
}

impl FromStr for CalendarDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self::from_naive)
            .map_err(|_| DateError::Malformed(s.to_string()))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
