#![deny(warnings)]

//! Calendar-driven season runtime.
//!
//! Ties the calendar, the schedule generator and the tournament bracket into
//! a day-by-day loop, plus the league configuration that seeds it and a
//! default rating-based outcome simulator.

pub mod config;
pub mod outcome;
pub mod season;

pub use config::{ConferenceConfig, ConfigError, LeagueConfig, TeamConfig};
pub use outcome::RatingOutcome;
pub use season::{
    advance_days, advance_one_day, advance_until_team_plays, run_to_completion, DayReport,
    RunSummary, SeasonArchive, SeasonEvent, SeasonPhase, SeasonState,
};

use season_schedule::ScheduleError;
use thiserror::Error;

/// Failure to set up a season.
#[derive(Debug, Error)]
pub enum SeasonError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Load-and-generate in one step.
pub fn season_from_config(config: &LeagueConfig) -> Result<SeasonState, SeasonError> {
    config.validate()?;
    let settings = config.settings_for(config.season_year)?;
    Ok(SeasonState::new_season(
        config.season_year,
        config.teams(),
        settings,
    )?)
}
