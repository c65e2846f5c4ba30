#![deny(warnings)]

//! Core domain models for the season engine.
//!
//! This crate defines the serializable vocabulary shared by the scheduler,
//! the tournament bracket and the calendar-driven loop: calendar days,
//! season anchors, teams, the indexed regular-season schedule, standings and
//! the seam to the external game-outcome simulator.

pub mod calendar;
pub mod date;
pub mod schedule;
pub mod standings;

pub use calendar::{build_annual_calendar, AnnualCalendar, CalendarPhase};
pub use date::{CalendarDate, DateError, Weekday};
pub use schedule::{GameId, ScheduledGame, SeasonSchedule};
pub use standings::{Standings, TeamRecord};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique team name, e.g. "Northfield".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub String);

/// Conference name, e.g. "Atlantic".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConferenceId(pub String);

macro_rules! string_id {
    ($ty:ident) => {
        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                $ty(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                $ty(s)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(TeamId);
string_id!(ConferenceId);

/// Read-only team input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub conference: Option<ConferenceId>,
    /// Ranking signal used for seeding and tie-breaks only.
    pub prestige: u32,
}

impl Team {
    pub fn new(id: impl Into<TeamId>, conference: Option<&str>, prestige: u32) -> Self {
        Self {
            id: id.into(),
            conference: conference.map(ConferenceId::from),
            prestige,
        }
    }
}

/// Final score of one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameScore {
    pub home: u32,
    pub away: u32,
}

/// The external box-score simulator. Only this signature is depended on.
pub trait OutcomeSimulator {
    fn simulate(&mut self, home: &TeamId, away: &TeamId, context_seed: u64) -> GameScore;
}

impl<F> OutcomeSimulator for F
where
    F: FnMut(&TeamId, &TeamId, u64) -> GameScore,
{
    fn simulate(&mut self, home: &TeamId, away: &TeamId, context_seed: u64) -> GameScore {
        self(home, away, context_seed)
    }
}

/// Regular-season generation settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// Exact number of games every team plays.
    pub games_per_team: u32,
    /// In-conference games per team, keyed by conference.
    pub conference_quotas: BTreeMap<ConferenceId, u32>,
    /// Upper bound on meetings between any two teams.
    #[serde(default = "default_max_meetings")]
    pub max_meetings_per_pair: u32,
    /// Days inside the playing window on which nothing is scheduled.
    #[serde(default)]
    pub blackout_dates: Vec<CalendarDate>,
    /// Seed for the generator's deterministic RNG.
    #[serde(default)]
    pub rng_seed: u64,
    /// Bounded retries for the randomized steps.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_meetings() -> u32 {
    2
}

fn default_max_attempts() -> u32 {
    16
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            games_per_team: 31,
            conference_quotas: BTreeMap::new(),
            max_meetings_per_pair: default_max_meetings(),
            blackout_dates: Vec::new(),
            rng_seed: 0,
            max_attempts: default_max_attempts(),
        }
    }
}

impl ScheduleSettings {
    /// Conference quota for a team; independents have none.
    pub fn quota_for(&self, conference: Option<&ConferenceId>) -> u32 {
        conference
            .and_then(|c| self.conference_quotas.get(c))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_blackout(&self, date: CalendarDate) -> bool {
        self.blackout_dates.contains(&date)
    }
}

/// Stages of the national tournament, earliest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TournamentStage {
    /// Play-in games feeding the 16-seed slots.
    FirstFour,
    RoundOf64,
    RoundOf32,
    Sweet16,
    Elite8,
    /// National semifinals.
    FinalFour,
    Championship,
}

impl TournamentStage {
    pub const ALL: [TournamentStage; 7] = [
        TournamentStage::FirstFour,
        TournamentStage::RoundOf64,
        TournamentStage::RoundOf32,
        TournamentStage::Sweet16,
        TournamentStage::Elite8,
        TournamentStage::FinalFour,
        TournamentStage::Championship,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TournamentStage::FirstFour => "First Four",
            TournamentStage::RoundOf64 => "Round of 64",
            TournamentStage::RoundOf32 => "Round of 32",
            TournamentStage::Sweet16 => "Sweet 16",
            TournamentStage::Elite8 => "Elite Eight",
            TournamentStage::FinalFour => "Final Four",
            TournamentStage::Championship => "Championship",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            TournamentStage::FirstFour => Some(TournamentStage::RoundOf64),
            TournamentStage::RoundOf64 => Some(TournamentStage::RoundOf32),
            TournamentStage::RoundOf32 => Some(TournamentStage::Sweet16),
            TournamentStage::Sweet16 => Some(TournamentStage::Elite8),
            TournamentStage::Elite8 => Some(TournamentStage::FinalFour),
            TournamentStage::FinalFour => Some(TournamentStage::Championship),
            TournamentStage::Championship => None,
        }
    }

    /// Round number inside a region (Round of 64 = 1 .. Elite 8 = 4).
    pub fn region_round(self) -> Option<usize> {
        match self {
            TournamentStage::RoundOf64 => Some(1),
            TournamentStage::RoundOf32 => Some(2),
            TournamentStage::Sweet16 => Some(3),
            TournamentStage::Elite8 => Some(4),
            _ => None,
        }
    }

    pub fn from_region_round(round: usize) -> Option<Self> {
        match round {
            1 => Some(TournamentStage::RoundOf64),
            2 => Some(TournamentStage::RoundOf32),
            3 => Some(TournamentStage::Sweet16),
            4 => Some(TournamentStage::Elite8),
            _ => None,
        }
    }

    /// Global round number: First Four = 0 .. Championship = 6.
    pub fn round_number(self) -> u8 {
        match self {
            TournamentStage::FirstFour => 0,
            TournamentStage::RoundOf64 => 1,
            TournamentStage::RoundOf32 => 2,
            TournamentStage::Sweet16 => 3,
            TournamentStage::Elite8 => 4,
            TournamentStage::FinalFour => 5,
            TournamentStage::Championship => 6,
        }
    }
}
