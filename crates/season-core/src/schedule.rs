//! Scheduled games and the indices that make the schedule cheap to query.

use crate::calendar::week_number;
use crate::date::CalendarDate;
use crate::{ConferenceId, GameScore, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Dense game identifier; equals the game's position in the schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameId(pub u32);

/// One regular-season game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub id: GameId,
    pub date: CalendarDate,
    pub home: TeamId,
    pub away: TeamId,
    /// Set when both teams belong to the same conference.
    pub conference: Option<ConferenceId>,
    pub played: bool,
    pub score: Option<GameScore>,
}

impl ScheduledGame {
    pub fn involves(&self, team: &TeamId) -> bool {
        &self.home == team || &self.away == team
    }

    pub fn opponent_of(&self, team: &TeamId) -> Option<&TeamId> {
        if &self.home == team {
            Some(&self.away)
        } else if &self.away == team {
            Some(&self.home)
        } else {
            None
        }
    }

    pub fn is_conference_game(&self) -> bool {
        self.conference.is_some()
    }

    /// Winner of a played game; ties go to the home team.
    pub fn winner(&self) -> Option<&TeamId> {
        let score = self.score.as_ref()?;
        if score.home >= score.away {
            Some(&self.home)
        } else {
            Some(&self.away)
        }
    }
}

/// A full regular-season schedule.
///
/// Games live in a dense vector (id == index) with two secondary indices:
/// date → ids and team → date → id. The week-bucketed view is computed on
/// demand from `season_start` and never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSchedule {
    pub season_year: i32,
    pub season_start: CalendarDate,
    pub regular_season_end: CalendarDate,
    games: Vec<ScheduledGame>,
    by_date: BTreeMap<CalendarDate, Vec<GameId>>,
    by_team: HashMap<TeamId, BTreeMap<CalendarDate, GameId>>,
}

impl SeasonSchedule {
    pub fn new(
        season_year: i32,
        season_start: CalendarDate,
        regular_season_end: CalendarDate,
    ) -> Self {
        Self {
            season_year,
            season_start,
            regular_season_end,
            games: Vec::new(),
            by_date: BTreeMap::new(),
            by_team: HashMap::new(),
        }
    }

    /// Rebuild all indices from a flat game list, e.g. when loading a save
    /// written before the indices existed. Games keep their relative id order
    /// but are renumbered densely.
    pub fn from_games(
        season_year: i32,
        season_start: CalendarDate,
        regular_season_end: CalendarDate,
        mut games: Vec<ScheduledGame>,
    ) -> Self {
        games.sort_by_key(|g| g.id);
        let mut schedule = Self::new(season_year, season_start, regular_season_end);
        for mut game in games {
            game.id = GameId(schedule.games.len() as u32);
            schedule.index(&game);
            schedule.games.push(game);
        }
        schedule
    }

    /// Append an unplayed game and index it. The caller guarantees neither
    /// team already has a game on `date`.
    pub fn insert_game(
        &mut self,
        date: CalendarDate,
        home: TeamId,
        away: TeamId,
        conference: Option<ConferenceId>,
    ) -> GameId {
        let game = ScheduledGame {
            id: GameId(self.games.len() as u32),
            date,
            home,
            away,
            conference,
            played: false,
            score: None,
        };
        let id = game.id;
        self.index(&game);
        self.games.push(game);
        id
    }

    fn index(&mut self, game: &ScheduledGame) {
        self.by_date.entry(game.date).or_default().push(game.id);
        for team in [&game.home, &game.away] {
            self.by_team
                .entry(team.clone())
                .or_default()
                .insert(game.date, game.id);
        }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn game(&self, id: GameId) -> Option<&ScheduledGame> {
        self.games.get(id.0 as usize)
    }

    pub fn games(&self) -> &[ScheduledGame] {
        &self.games
    }

    pub fn into_games(self) -> Vec<ScheduledGame> {
        self.games
    }

    /// Games scheduled on `date`.
    pub fn games_on(&self, date: CalendarDate) -> impl Iterator<Item = &ScheduledGame> + '_ {
        self.by_date
            .get(&date)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.game(*id))
    }

    /// Ids of games on `date` that are still unplayed.
    pub fn unplayed_on(&self, date: CalendarDate) -> Vec<GameId> {
        self.games_on(date)
            .filter(|g| !g.played)
            .map(|g| g.id)
            .collect()
    }

    /// A team's full schedule in date order.
    pub fn team_schedule<'a>(
        &'a self,
        team: &TeamId,
    ) -> impl Iterator<Item = &'a ScheduledGame> + 'a {
        self.by_team
            .get(team)
            .into_iter()
            .flat_map(|by_date| by_date.values())
            .filter_map(move |id| self.game(*id))
    }

    pub fn team_game_on(&self, team: &TeamId, date: CalendarDate) -> Option<&ScheduledGame> {
        let id = self.by_team.get(team)?.get(&date)?;
        self.game(*id)
    }

    pub fn team_game_count(&self, team: &TeamId) -> usize {
        self.by_team.get(team).map_or(0, BTreeMap::len)
    }

    /// First date on/after `from` with an unplayed game for `team`.
    pub fn next_game_date_for(&self, team: &TeamId, from: CalendarDate) -> Option<CalendarDate> {
        self.by_team
            .get(team)?
            .range(from..)
            .find(|(_, id)| self.game(**id).is_some_and(|g| !g.played))
            .map(|(date, _)| *date)
    }

    /// Every date that has at least one game, ascending.
    pub fn dates(&self) -> impl Iterator<Item = CalendarDate> + '_ {
        self.by_date.keys().copied()
    }

    pub fn teams(&self) -> impl Iterator<Item = &TeamId> {
        self.by_team.keys()
    }

    /// Ids listed for `date` in the date index (used by consistency checks).
    pub fn indexed_on(&self, date: CalendarDate) -> &[GameId] {
        self.by_date.get(&date).map_or(&[][..], Vec::as_slice)
    }

    /// Record a result. Returns `false` without touching anything when the
    /// game does not exist or was already played.
    pub fn record_result(&mut self, id: GameId, score: GameScore) -> bool {
        match self.games.get_mut(id.0 as usize) {
            Some(game) if !game.played => {
                game.played = true;
                game.score = Some(score);
                true
            }
            Some(_) => {
                debug!(game = id.0, "result already recorded, ignoring");
                false
            }
            None => false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.games.iter().all(|g| g.played)
    }

    pub fn played_count(&self) -> usize {
        self.games.iter().filter(|g| g.played).count()
    }

    /// 1-based week number of `date`, derived from `season_start`.
    pub fn week_of(&self, date: CalendarDate) -> i32 {
        week_number(self.season_start, date)
    }

    /// Week-bucketed view for week-oriented consumers.
    pub fn games_by_week(&self) -> BTreeMap<i32, Vec<GameId>> {
        let mut weeks: BTreeMap<i32, Vec<GameId>> = BTreeMap::new();
        for (date, ids) in &self.by_date {
            weeks
                .entry(self.week_of(*date))
                .or_default()
                .extend(ids.iter().copied());
        }
        weeks
    }
}
