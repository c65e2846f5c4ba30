#![deny(warnings)]

//! Regular-season schedule generation and validation.
//!
//! - [`generate`] builds a conflict-free schedule from teams, settings and the
//!   season anchors, deterministically for a given `rng_seed`.
//! - [`validate`] re-checks the hard invariants and returns one message per
//!   violation; an empty list means the schedule is valid.

mod generator;
mod validator;

pub use generator::generate;
pub use validator::validate;

use thiserror::Error;

/// Settings that cannot produce a valid schedule, or a generator that ran out
/// of retries. Fatal to the season transition that requested the schedule.
#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("team {0} is listed more than once")]
    DuplicateTeam(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("conference {conference}: quota {quota} needs more than {size} teams")]
    QuotaTooLarge {
        conference: String,
        quota: u32,
        size: u32,
    },
    #[error("conference {conference}: quota {quota} exceeds {games} games per team")]
    QuotaExceedsGames {
        conference: String,
        quota: u32,
        games: u32,
    },
    #[error(
        "conference {conference}: odd quota {quota} with odd size {size} cannot pair every team"
    )]
    OddConference {
        conference: String,
        quota: u32,
        size: u32,
    },
    #[error("{games} games per team do not fit in {available} playable dates")]
    NotEnoughDates { games: u32, available: u32 },
    #[error("{0} non-conference slots league-wide cannot be paired (odd total)")]
    OddNonConferenceSlots(u64),
    #[error("{scope} needs {needed} non-conference games but only {available} are available")]
    NonConferenceInfeasible {
        scope: String,
        needed: u64,
        available: u64,
    },
    /// Every attempt failed. Passing the up-front checks does not guarantee
    /// a schedule: date assignment always succeeds with at least
    /// `2 * games_per_team - 1` open dates, but below that a dense league
    /// can run out of common free dates on every attempt.
    #[error("no valid schedule found after {attempts} attempts")]
    Exhausted { attempts: u32 },
}
