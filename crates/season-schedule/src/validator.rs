use season_core::{
    CalendarDate, ConferenceId, GameId, ScheduleSettings, SeasonSchedule, Team, TeamId,
};
use std::collections::{BTreeMap, HashMap};

/// Re-check a schedule's hard invariants.
///
/// Returns one human-readable message per violation, in a stable order. An
/// empty list means the schedule is valid for `teams` and `settings`.
pub fn validate(
    schedule: &SeasonSchedule,
    teams: &[Team],
    settings: &ScheduleSettings,
) -> Vec<String> {
    let mut issues = Vec::new();
    let conference_of: HashMap<&TeamId, Option<&ConferenceId>> = teams
        .iter()
        .map(|t| (&t.id, t.conference.as_ref()))
        .collect();
    let (start, end) = (schedule.season_start, schedule.regular_season_end);

    let mut booked: HashMap<(&TeamId, CalendarDate), GameId> = HashMap::new();
    let mut totals: BTreeMap<&TeamId, (u32, u32)> = BTreeMap::new();
    let mut meetings: BTreeMap<(&TeamId, &TeamId), u32> = BTreeMap::new();

    for (pos, game) in schedule.games().iter().enumerate() {
        let id = game.id.0;
        if game.id.0 as usize != pos {
            issues.push(format!("Game #{id} is stored at position {pos}"));
        }
        for team in [&game.home, &game.away] {
            if !conference_of.contains_key(team) {
                issues.push(format!("Game #{id} references unknown team {team}"));
            }
        }
        if game.home == game.away {
            issues.push(format!("Game #{id} matches {} against itself", game.home));
        }
        if game.date < start || game.date > end {
            issues.push(format!(
                "Game #{id} on {} is outside the playing window {start}..{end}",
                game.date
            ));
        }
        if settings.is_blackout(game.date) {
            issues.push(format!("Game #{id} is on blackout date {}", game.date));
        }

        let home_conf = conference_of.get(&game.home).copied().flatten();
        let away_conf = conference_of.get(&game.away).copied().flatten();
        let shared = match (home_conf, away_conf) {
            (Some(a), Some(b)) if a == b => Some(a),
            _ => None,
        };
        if game.conference.as_ref() != shared {
            issues.push(format!(
                "Game #{id} conference tag {:?} does not match its teams",
                game.conference.as_ref().map(|c| c.0.as_str())
            ));
        }

        for team in [&game.home, &game.away] {
            if let Some(other) = booked.insert((team, game.date), game.id) {
                issues.push(format!(
                    "Team {team} double-booked on {} (games #{} and #{id})",
                    game.date, other.0
                ));
            }
            let entry = totals.entry(team).or_default();
            entry.0 += 1;
            if game.conference.is_some() {
                entry.1 += 1;
            }
        }
        let pair = if game.home <= game.away {
            (&game.home, &game.away)
        } else {
            (&game.away, &game.home)
        };
        *meetings.entry(pair).or_default() += 1;

        if !schedule.indexed_on(game.date).contains(&game.id) {
            issues.push(format!("Game #{id} is missing from the date index"));
        }
        for team in [&game.home, &game.away] {
            let indexed = schedule.team_game_on(team, game.date).map(|g| g.id);
            if indexed != Some(game.id) {
                issues.push(format!(
                    "Game #{id} is missing from the team index for {team}"
                ));
            }
        }
    }

    for team in teams {
        let (games, conference) = totals.get(&team.id).copied().unwrap_or((0, 0));
        if games != settings.games_per_team {
            issues.push(format!(
                "Team {} has {games} games, expected {}",
                team.id, settings.games_per_team
            ));
        }
        let quota = settings.quota_for(team.conference.as_ref());
        if conference != quota {
            issues.push(format!(
                "Team {} has {conference} conference games, expected {quota}",
                team.id
            ));
        }
    }

    for ((a, b), count) in meetings {
        if count > settings.max_meetings_per_pair {
            issues.push(format!(
                "{a} and {b} meet {count} times, more than {}",
                settings.max_meetings_per_pair
            ));
        }
    }
    issues
}
