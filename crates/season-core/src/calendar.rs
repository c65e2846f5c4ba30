//! Season anchors derived from a season-year.

use crate::date::{CalendarDate, Weekday};
use crate::TournamentStage;
use serde::{Deserialize, Serialize};

/// Named key dates for one season. Built once per season by
/// [`build_annual_calendar`]; a pure function of the season-year.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualCalendar {
    /// Year the season starts in (the 2025 season ends in 2026).
    pub season_year: i32,
    /// First Monday on/after Nov 1.
    pub season_start: CalendarDate,
    /// First Saturday on/after Jan 1 of the following year.
    pub conference_play_start: CalendarDate,
    /// First Sunday on/after Mar 1 of the following year.
    pub regular_season_end: CalendarDate,
    /// Monday after the regular season ends.
    pub conference_tournament_start: CalendarDate,
    /// Saturday closing conference tournament week.
    pub conference_tournament_end: CalendarDate,
    /// Sunday on which the national field is announced.
    pub selection_day: CalendarDate,
    /// First Four day, two days after selection.
    pub national_tournament_start: CalendarDate,
    /// Championship day.
    pub national_tournament_end: CalendarDate,
    /// Nov 13 of the season-year.
    pub early_signing_start: CalendarDate,
    /// Nov 20 of the season-year.
    pub early_signing_end: CalendarDate,
    /// Apr 15 of the following year.
    pub regular_signing_start: CalendarDate,
    /// May 20 of the following year.
    pub regular_signing_end: CalendarDate,
    /// Mar 25 of the following year.
    pub transfer_window_open: CalendarDate,
    /// Apr 30 of the following year.
    pub transfer_window_close: CalendarDate,
    /// Apr 25 of the following year.
    pub draft_early_entry_deadline: CalendarDate,
    /// May 29 of the following year.
    pub draft_withdrawal_deadline: CalendarDate,
    /// Jun 25 of the following year.
    pub draft_day: CalendarDate,
    /// Last day before the next season-year takes over.
    pub season_rollover: CalendarDate,
}

/// Coarse phase of the season as implied by the calendar alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CalendarPhase {
    Preseason,
    RegularSeason,
    ConferenceTournament,
    SelectionWeek,
    NationalTournament,
    Offseason,
}

/// Derive every anchor for `season_year`.
///
/// Dates in the following calendar year are built from `season_year + 1`
/// directly; nothing relies on rolling a date past Dec 31.
pub fn build_annual_calendar(season_year: i32) -> AnnualCalendar {
    let next_year = season_year + 1;

    let season_start =
        CalendarDate::from_civil(season_year, 11, 1).next_weekday_on_or_after(Weekday::Mon);
    let conference_play_start =
        CalendarDate::from_civil(next_year, 1, 1).next_weekday_on_or_after(Weekday::Sat);
    let regular_season_end =
        CalendarDate::from_civil(next_year, 3, 1).next_weekday_on_or_after(Weekday::Sun);
    let selection_day = regular_season_end.add_days(7);

    AnnualCalendar {
        season_year,
        season_start,
        conference_play_start,
        regular_season_end,
        conference_tournament_start: regular_season_end.add_days(1),
        conference_tournament_end: regular_season_end.add_days(6),
        selection_day,
        national_tournament_start: selection_day.add_days(2),
        national_tournament_end: selection_day.add_days(22),
        early_signing_start: CalendarDate::from_civil(season_year, 11, 13),
        early_signing_end: CalendarDate::from_civil(season_year, 11, 20),
        regular_signing_start: CalendarDate::from_civil(next_year, 4, 15),
        regular_signing_end: CalendarDate::from_civil(next_year, 5, 20),
        transfer_window_open: CalendarDate::from_civil(next_year, 3, 25),
        transfer_window_close: CalendarDate::from_civil(next_year, 4, 30),
        draft_early_entry_deadline: CalendarDate::from_civil(next_year, 4, 25),
        draft_withdrawal_deadline: CalendarDate::from_civil(next_year, 5, 29),
        draft_day: CalendarDate::from_civil(next_year, 6, 25),
        season_rollover: CalendarDate::from_civil(next_year, 6, 30),
    }
}

impl AnnualCalendar {
    /// Inclusive regular-season playing window.
    pub fn playing_window(&self) -> (CalendarDate, CalendarDate) {
        (self.season_start, self.regular_season_end)
    }

    pub fn is_in_playing_window(&self, date: CalendarDate) -> bool {
        date >= self.season_start && date <= self.regular_season_end
    }

    /// Day on which `stage` of the national tournament is played.
    pub fn stage_date(&self, stage: TournamentStage) -> CalendarDate {
        let offset = match stage {
            TournamentStage::FirstFour => 2,
            TournamentStage::RoundOf64 => 4,
            TournamentStage::RoundOf32 => 6,
            TournamentStage::Sweet16 => 11,
            TournamentStage::Elite8 => 13,
            TournamentStage::FinalFour => 20,
            TournamentStage::Championship => 22,
        };
        self.selection_day.add_days(offset)
    }

    pub fn phase_on(&self, date: CalendarDate) -> CalendarPhase {
        if date < self.season_start {
            CalendarPhase::Preseason
        } else if date <= self.regular_season_end {
            CalendarPhase::RegularSeason
        } else if date <= self.conference_tournament_end {
            CalendarPhase::ConferenceTournament
        } else if date < self.national_tournament_start {
            CalendarPhase::SelectionWeek
        } else if date <= self.national_tournament_end {
            CalendarPhase::NationalTournament
        } else {
            CalendarPhase::Offseason
        }
    }

    /// 1-based week number counted from `season_start`. Days before the
    /// season start map to week 0 or below.
    pub fn week_of(&self, date: CalendarDate) -> i32 {
        week_number(self.season_start, date)
    }

    /// First day of the 1-based `week`.
    pub fn week_start(&self, week: i32) -> CalendarDate {
        self.season_start.add_days((week - 1) * 7)
    }
}

/// Shared week arithmetic: `(date - start) div 7`, 1-based.
pub(crate) fn week_number(season_start: CalendarDate, date: CalendarDate) -> i32 {
    date.diff_days(season_start).div_euclid(7) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    #[test]
    fn anchors_for_2025() {
        let cal = build_annual_calendar(2025);
        assert_eq!(cal.season_start, d("2025-11-03"));
        assert_eq!(cal.season_start.weekday(), Weekday::Mon);
        assert_eq!(cal.regular_season_end, d("2026-03-01"));
        assert_eq!(cal.regular_season_end.weekday(), Weekday::Sun);
        assert_eq!(cal.conference_play_start, d("2026-01-03"));
        assert_eq!(cal.conference_tournament_start, d("2026-03-02"));
        assert_eq!(cal.conference_tournament_end, d("2026-03-07"));
        assert_eq!(cal.selection_day, d("2026-03-08"));
        assert_eq!(cal.national_tournament_start, d("2026-03-10"));
        assert_eq!(cal.national_tournament_end, d("2026-03-30"));
        assert_eq!(cal.transfer_window_open, d("2026-03-25"));
        assert_eq!(cal.draft_day, d("2026-06-25"));
    }

    #[test]
    fn next_year_fields_use_following_year() {
        let cal = build_annual_calendar(2030);
        assert_eq!(cal.regular_signing_start.year(), 2031);
        assert_eq!(cal.season_rollover.year(), 2031);
        assert_eq!(cal.early_signing_start.year(), 2030);
    }

    #[test]
    fn stage_dates_are_ordered_and_inside_the_window() {
        let cal = build_annual_calendar(2025);
        let mut prev = cal.selection_day;
        for stage in TournamentStage::ALL {
            let date = cal.stage_date(stage);
            assert!(date > prev, "{stage:?} not after previous stage");
            assert!(date >= cal.national_tournament_start);
            assert!(date <= cal.national_tournament_end);
            prev = date;
        }
        assert_eq!(
            cal.stage_date(TournamentStage::Championship),
            cal.national_tournament_end
        );
    }

    #[test]
    fn phases_follow_anchors() {
        let cal = build_annual_calendar(2025);
        assert_eq!(cal.phase_on(d("2025-10-01")), CalendarPhase::Preseason);
        assert_eq!(cal.phase_on(cal.season_start), CalendarPhase::RegularSeason);
        assert_eq!(cal.phase_on(cal.regular_season_end), CalendarPhase::RegularSeason);
        assert_eq!(cal.phase_on(d("2026-03-04")), CalendarPhase::ConferenceTournament);
        assert_eq!(cal.phase_on(cal.selection_day), CalendarPhase::SelectionWeek);
        assert_eq!(cal.phase_on(d("2026-03-20")), CalendarPhase::NationalTournament);
        assert_eq!(cal.phase_on(d("2026-05-01")), CalendarPhase::Offseason);
    }

    #[test]
    fn week_bridge() {
        let cal = build_annual_calendar(2025);
        assert_eq!(cal.week_of(cal.season_start), 1);
        assert_eq!(cal.week_of(cal.season_start.add_days(6)), 1);
        assert_eq!(cal.week_of(cal.season_start.add_days(7)), 2);
        assert_eq!(cal.week_of(cal.season_start.add_days(-1)), 0);
        assert_eq!(cal.week_start(3), cal.season_start.add_days(14));
    }

    proptest! {
        #[test]
        fn deterministic_and_well_formed(year in 1900i32..2200) {
            let a = build_annual_calendar(year);
            let b = build_annual_calendar(year);
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.season_start.weekday(), Weekday::Mon);
            prop_assert_eq!(a.regular_season_end.weekday(), Weekday::Sun);
            prop_assert!(a.season_start < a.conference_play_start);
            prop_assert!(a.conference_play_start < a.regular_season_end);
            prop_assert!(a.national_tournament_end < a.season_rollover);
            let (y, m, day) = a.season_start.ymd();
            prop_assert_eq!((y, m), (year, 11));
            prop_assert!(day <= 7);
        }

        #[test]
        fn week_start_inverts_week_of(week in 1i32..30) {
            let cal = build_annual_calendar(2025);
            prop_assert_eq!(cal.week_of(cal.week_start(week)), week);
        }
    }
}
