//! Win/loss records derived from played games.

use crate::schedule::SeasonSchedule;
use crate::{Team, TeamId};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub wins: u32,
    pub losses: u32,
    pub conference_wins: u32,
    pub conference_losses: u32,
    pub points_for: u64,
    pub points_against: u64,
}

impl TeamRecord {
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn point_differential(&self) -> i64 {
        self.points_for as i64 - self.points_against as i64
    }
}

/// Records for every team, recomputed from the schedule on demand.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub records: BTreeMap<TeamId, TeamRecord>,
}

impl Standings {
    /// Tally every played game. Teams listed in `teams` appear even with no
    /// games played.
    pub fn from_schedule(schedule: &SeasonSchedule, teams: &[Team]) -> Self {
        let mut records: BTreeMap<TeamId, TeamRecord> = teams
            .iter()
            .map(|t| (t.id.clone(), TeamRecord::default()))
            .collect();
        for game in schedule.games().iter().filter(|g| g.played) {
            let Some(score) = game.score else { continue };
            let Some(winner) = game.winner() else { continue };
            let home_won = winner == &game.home;
            let conference = game.is_conference_game();

            let home = records.entry(game.home.clone()).or_default();
            tally(home, home_won, conference, score.home, score.away);
            let away = records.entry(game.away.clone()).or_default();
            tally(away, !home_won, conference, score.away, score.home);
        }
        Self { records }
    }

    pub fn record(&self, team: &TeamId) -> Option<&TeamRecord> {
        self.records.get(team)
    }

    pub fn wins(&self, team: &TeamId) -> u32 {
        self.record(team).map_or(0, |r| r.wins)
    }

    /// Teams ordered by wins, then point differential, then name.
    pub fn ranked(&self) -> Vec<(&TeamId, &TeamRecord)> {
        let mut rows: Vec<_> = self.records.iter().collect();
        rows.sort_by_key(|(id, r)| (Reverse(r.wins), Reverse(r.point_differential()), *id));
        rows
    }
}

fn tally(record: &mut TeamRecord, won: bool, conference: bool, scored: u32, allowed: u32) {
    if won {
        record.wins += 1;
        if conference {
            record.conference_wins += 1;
        }
    } else {
        record.losses += 1;
        if conference {
            record.conference_losses += 1;
        }
    }
    record.points_for += u64::from(scored);
    record.points_against += u64::from(allowed);
}
