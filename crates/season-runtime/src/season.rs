//! The calendar-driven season loop.
//!
//! Every operation takes the state by value and hands back the new state
//! together with an explicit list of what changed. A day is either committed
//! completely or (for schedule generation errors) not at all.

use season_bracket::{entrants_from, MatchupResult, Tournament};
use season_core::{
    build_annual_calendar, AnnualCalendar, CalendarDate, GameId, GameScore, OutcomeSimulator,
    ScheduleSettings, SeasonSchedule, Standings, Team, TeamId, TournamentStage,
};
use season_schedule::{generate, validate, ScheduleError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonPhase {
    RegularSeason,
    Tournament,
    Complete,
}

/// One entry of the "what changed" list returned by the loop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonEvent {
    GamePlayed {
        game: GameId,
        home: TeamId,
        away: TeamId,
        score: GameScore,
    },
    TournamentCreated {
        entrants: usize,
    },
    StagePlayed {
        stage: TournamentStage,
        results: Vec<MatchupResult>,
    },
    ChampionCrowned {
        team: TeamId,
    },
    PhaseChanged {
        from: SeasonPhase,
        to: SeasonPhase,
    },
}

impl SeasonEvent {
    /// Whether `team` took part in a game or matchup reported by this event.
    pub fn involves(&self, team: &TeamId) -> bool {
        match self {
            SeasonEvent::GamePlayed { home, away, .. } => home == team || away == team,
            SeasonEvent::StagePlayed { results, .. } => results.iter().any(|r| {
                !r.forfeit && (r.winner.as_ref() == Some(team) || r.loser.as_ref() == Some(team))
            }),
            _ => false,
        }
    }
}

/// Result of simulating one calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    /// The day that was simulated.
    pub date: CalendarDate,
    pub events: Vec<SeasonEvent>,
    pub simulated_games: usize,
    pub something_happened: bool,
}

impl DayReport {
    pub fn involves(&self, team: &TeamId) -> bool {
        self.events.iter().any(|e| e.involves(team))
    }
}

/// Everything needed to continue a season from any day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonState {
    pub calendar: AnnualCalendar,
    pub teams: Vec<Team>,
    pub settings: ScheduleSettings,
    pub schedule: SeasonSchedule,
    pub tournament: Option<Tournament>,
    pub current_date: CalendarDate,
    pub phase: SeasonPhase,
}

/// A finished (or abandoned) season kept for history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonArchive {
    pub season_year: i32,
    pub champion: Option<TeamId>,
    pub standings: Standings,
    pub schedule: SeasonSchedule,
    pub tournament: Option<Tournament>,
}

/// Totals of a [`run_to_completion`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub days: u32,
    pub games_played: usize,
    pub stages_played: usize,
    pub champion: Option<TeamId>,
}

impl SeasonState {
    /// Build the calendar and a fresh schedule for `season_year`.
    pub fn new_season(
        season_year: i32,
        teams: Vec<Team>,
        settings: ScheduleSettings,
    ) -> Result<Self, ScheduleError> {
        let calendar = build_annual_calendar(season_year);
        let schedule = generate(season_year, &teams, &settings, &calendar)?;
        for issue in validate(&schedule, &teams, &settings) {
            warn!(season_year, %issue, "schedule validation issue");
        }
        info!(
            season_year,
            start = %calendar.season_start,
            end = %calendar.regular_season_end,
            games = schedule.len(),
            "season initialized"
        );
        Ok(Self {
            current_date: calendar.season_start,
            calendar,
            teams,
            settings,
            schedule,
            tournament: None,
            phase: SeasonPhase::RegularSeason,
        })
    }

    pub fn season_year(&self) -> i32 {
        self.calendar.season_year
    }

    pub fn standings(&self) -> Standings {
        Standings::from_schedule(&self.schedule, &self.teams)
    }

    pub fn champion(&self) -> Option<&TeamId> {
        self.tournament.as_ref().and_then(|t| t.champion.as_ref())
    }

    pub fn archive(&self) -> SeasonArchive {
        SeasonArchive {
            season_year: self.season_year(),
            champion: self.champion().cloned(),
            standings: self.standings(),
            schedule: self.schedule.clone(),
            tournament: self.tournament.clone(),
        }
    }

    /// Archive this season and start the next one with the same teams.
    ///
    /// Blackout dates move forward a year (a Feb 29 with no counterpart is
    /// dropped) and the generator seed is advanced so consecutive seasons
    /// differ.
    pub fn next_season(self) -> Result<(SeasonState, SeasonArchive), ScheduleError> {
        let archive = self.archive();
        if self.phase != SeasonPhase::Complete {
            warn!(
                season_year = archive.season_year,
                "rolling over a season that has not finished"
            );
        }
        let year = self.season_year() + 1;
        let mut settings = self.settings;
        settings.rng_seed = settings.rng_seed.wrapping_add(1);
        settings.blackout_dates = settings
            .blackout_dates
            .iter()
            .filter_map(|date| {
                let (y, m, d) = date.ymd();
                let moved = CalendarDate::from_ymd(y + 1, m, d).ok();
                if moved.is_none() {
                    warn!(blackout = %date, "blackout has no date next season, dropping it");
                }
                moved
            })
            .collect();
        let next = SeasonState::new_season(year, self.teams, settings)?;
        Ok((next, archive))
    }
}

fn game_seed(rng_seed: u64, game: GameId) -> u64 {
    rng_seed ^ u64::from(game.0).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Simulate `state.current_date` and move to the next day.
///
/// Plays every unplayed regular-season game dated today, then any tournament
/// stage whose calendar date has arrived. If the new date is past the end of
/// the regular season and no tournament exists yet, one is created from the
/// standings.
pub fn advance_one_day<O>(mut state: SeasonState, outcome: &mut O) -> (SeasonState, DayReport)
where
    O: OutcomeSimulator + ?Sized,
{
    let today = state.current_date;
    let mut events = Vec::new();
    let mut simulated_games = 0;

    for id in state.schedule.unplayed_on(today) {
        let Some(game) = state.schedule.game(id) else {
            continue;
        };
        let (home, away) = (game.home.clone(), game.away.clone());
        let score = outcome.simulate(&home, &away, game_seed(state.settings.rng_seed, id));
        if state.schedule.record_result(id, score) {
            simulated_games += 1;
            events.push(SeasonEvent::GamePlayed {
                game: id,
                home,
                away,
                score,
            });
        }
    }

    if let Some(tournament) = state.tournament.as_mut() {
        while let Some(stage) = tournament.current_stage() {
            if state.calendar.stage_date(stage) > today {
                break;
            }
            let report = tournament.advance_stage(outcome);
            simulated_games += report.results.iter().filter(|r| !r.forfeit).count();
            events.push(SeasonEvent::StagePlayed {
                stage,
                results: report.results,
            });
            if let Some(team) = report.champion {
                events.push(SeasonEvent::ChampionCrowned { team });
            }
        }
        if tournament.is_complete() && state.phase != SeasonPhase::Complete {
            events.push(SeasonEvent::PhaseChanged {
                from: state.phase,
                to: SeasonPhase::Complete,
            });
            state.phase = SeasonPhase::Complete;
        }
    }

    state.current_date = today.add_days(1);

    if state.tournament.is_none() && state.current_date > state.calendar.regular_season_end {
        if !state.schedule.is_exhausted() {
            warn!(
                unplayed = state.schedule.len() - state.schedule.played_count(),
                "regular season closed with unplayed games"
            );
        }
        let entrants = entrants_from(&state.teams, &state.standings());
        state.tournament = Some(Tournament::create(&entrants));
        events.push(SeasonEvent::TournamentCreated {
            entrants: entrants.len(),
        });
        events.push(SeasonEvent::PhaseChanged {
            from: state.phase,
            to: SeasonPhase::Tournament,
        });
        state.phase = SeasonPhase::Tournament;
    }

    if !events.is_empty() {
        debug!(date = %today, events = events.len(), simulated_games, "day simulated");
    }
    let report = DayReport {
        date: today,
        something_happened: !events.is_empty(),
        events,
        simulated_games,
    };
    (state, report)
}

/// Advance `days` calendar days.
pub fn advance_days<O>(
    mut state: SeasonState,
    days: u32,
    outcome: &mut O,
) -> (SeasonState, Vec<DayReport>)
where
    O: OutcomeSimulator + ?Sized,
{
    let mut reports = Vec::with_capacity(days as usize);
    for _ in 0..days {
        let (next, report) = advance_one_day(state, outcome);
        state = next;
        reports.push(report);
    }
    (state, reports)
}

/// Advance until a day on which `team` plays, inclusive, giving up after
/// `max_days` or once the season is complete.
pub fn advance_until_team_plays<O>(
    mut state: SeasonState,
    team: &TeamId,
    max_days: u32,
    outcome: &mut O,
) -> (SeasonState, Vec<DayReport>)
where
    O: OutcomeSimulator + ?Sized,
{
    let mut reports = Vec::new();
    for _ in 0..max_days {
        if state.phase == SeasonPhase::Complete {
            break;
        }
        let (next, report) = advance_one_day(state, outcome);
        state = next;
        let played = report.involves(team);
        reports.push(report);
        if played {
            break;
        }
    }
    (state, reports)
}

/// Advance until the champion is crowned or `max_days` have passed.
pub fn run_to_completion<O>(
    mut state: SeasonState,
    max_days: u32,
    outcome: &mut O,
) -> (SeasonState, RunSummary)
where
    O: OutcomeSimulator + ?Sized,
{
    let mut summary = RunSummary::default();
    while state.phase != SeasonPhase::Complete && summary.days < max_days {
        let (next, report) = advance_one_day(state, outcome);
        state = next;
        summary.days += 1;
        for event in &report.events {
            match event {
                SeasonEvent::GamePlayed { .. } => summary.games_played += 1,
                SeasonEvent::StagePlayed { .. } => summary.stages_played += 1,
                _ => {}
            }
        }
    }
    summary.champion = state.champion().cloned();
    info!(
        season_year = state.season_year(),
        days = summary.days,
        games = summary.games_played,
        champion = ?summary.champion,
        "season run finished"
    );
    (state, summary)
}
