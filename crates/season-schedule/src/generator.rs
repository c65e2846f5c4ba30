//! Seeded regular-season generation.
//!
//! Hard constraints (exact per-team totals, exact conference quotas, one game
//! per team per date, dates inside the window) are never traded away: an
//! attempt that cannot meet them is discarded and the next seed is tried.
//! Home/away balance and even spreading across the window are soft goals,
//! pursued greedily with a bounded amount of effort.

use crate::validator::validate;
use crate::ScheduleError;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use season_core::{
    AnnualCalendar, CalendarDate, ConferenceId, ScheduleSettings, SeasonSchedule, Team,
};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

/// Passes over the non-conference games when evening out home/away counts.
const ORIENT_PASSES: usize = 8;
/// Penalty for a conference game before conference play starts (or the
/// reverse for non-conference games).
const PHASE_PENALTY: f64 = 1.5;
/// Penalty weights for another game of the same team 1, 2 and 3 days away.
const CROWDING: [f64; 3] = [2.0, 0.75, 0.25];
const JITTER: f64 = 0.25;

/// A matchup before it has a date. Indices refer to the input team slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pairing {
    home: usize,
    away: usize,
    conference: Option<usize>,
}

/// Generate a full regular-season schedule.
///
/// Fails fast with a configuration error when the settings are arithmetically
/// impossible; otherwise retries with derived seeds up to
/// `settings.max_attempts` times and only returns a schedule that passes
/// [`validate`].
pub fn generate(
    season_year: i32,
    teams: &[Team],
    settings: &ScheduleSettings,
    anchors: &AnnualCalendar,
) -> Result<SeasonSchedule, ScheduleError> {
    let window = Window::new(anchors, settings);
    let available = window.open_days();
    if !teams.is_empty() && settings.games_per_team as usize > available {
        return Err(ScheduleError::NotEnoughDates {
            games: settings.games_per_team,
            available: available as u32,
        });
    }
    let league = League::plan(teams, settings)?;
    let comfortable = (2 * settings.games_per_team as usize).saturating_sub(1);
    if !teams.is_empty() && available < comfortable {
        warn!(
            games_per_team = settings.games_per_team,
            available,
            comfortable,
            "dense window: date assignment may exhaust its attempts"
        );
    }

    info!(
        season_year,
        teams = teams.len(),
        conferences = league.conferences.len(),
        games_per_team = settings.games_per_team,
        "generating schedule"
    );

    let attempts = settings.max_attempts.max(1);
    for attempt in 0..attempts {
        let mut rng = ChaCha8Rng::seed_from_u64(attempt_seed(settings.rng_seed, attempt));
        let Some(pairings) = league.pairings(&mut rng) else {
            debug!(attempt, "non-conference fill got stuck, retrying");
            continue;
        };
        let Some(dates) = window.assign(teams.len(), &pairings, &mut rng) else {
            debug!(attempt, "date assignment got stuck, retrying");
            continue;
        };
        let schedule = league.build(season_year, anchors, &pairings, &dates);
        let issues = validate(&schedule, teams, settings);
        if issues.is_empty() {
            info!(attempt, games = schedule.len(), "schedule generated");
            return Ok(schedule);
        }
        warn!(
            attempt,
            issues = issues.len(),
            first = %issues[0],
            "generated schedule failed validation, retrying"
        );
    }
    Err(ScheduleError::Exhausted { attempts })
}

fn attempt_seed(seed: u64, attempt: u32) -> u64 {
    seed ^ u64::from(attempt).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Teams partitioned into conferences, with per-team quotas.
struct League<'a> {
    teams: &'a [Team],
    conferences: Vec<(ConferenceId, Vec<usize>)>,
    conference_quota: Vec<u32>,
    conference_of: Vec<Option<usize>>,
    quota: Vec<u32>,
    games_per_team: u32,
    cap: u32,
}

impl<'a> League<'a> {
    /// Partition the league and reject settings no schedule can satisfy.
    fn plan(teams: &'a [Team], settings: &ScheduleSettings) -> Result<Self, ScheduleError> {
        if settings.max_meetings_per_pair == 0 {
            return Err(ScheduleError::InvalidSettings(
                "max_meetings_per_pair must be at least 1".into(),
            ));
        }
        let mut seen = HashSet::new();
        for team in teams {
            if !seen.insert(&team.id) {
                return Err(ScheduleError::DuplicateTeam(team.id.to_string()));
            }
        }

        let mut grouped: BTreeMap<&ConferenceId, Vec<usize>> = BTreeMap::new();
        for (i, team) in teams.iter().enumerate() {
            if let Some(conference) = &team.conference {
                grouped.entry(conference).or_default().push(i);
            }
        }
        let conferences: Vec<(ConferenceId, Vec<usize>)> = grouped
            .into_iter()
            .map(|(id, members)| (id.clone(), members))
            .collect();
        for configured in settings.conference_quotas.keys() {
            if !conferences.iter().any(|(id, _)| id == configured) {
                warn!(conference = %configured, "quota configured for a conference with no teams");
            }
        }

        let games = settings.games_per_team;
        let mut conference_of = vec![None; teams.len()];
        let mut quota = vec![0u32; teams.len()];
        let mut conference_quota = Vec::with_capacity(conferences.len());
        for (ci, (id, members)) in conferences.iter().enumerate() {
            let q = settings.quota_for(Some(id));
            let size = members.len() as u32;
            if q > games {
                return Err(ScheduleError::QuotaExceedsGames {
                    conference: id.to_string(),
                    quota: q,
                    games,
                });
            }
            if q > 0 && q >= size {
                return Err(ScheduleError::QuotaTooLarge {
                    conference: id.to_string(),
                    quota: q,
                    size,
                });
            }
            if q % 2 == 1 && size % 2 == 1 {
                return Err(ScheduleError::OddConference {
                    conference: id.to_string(),
                    quota: q,
                    size,
                });
            }
            conference_quota.push(q);
            for &m in members {
                conference_of[m] = Some(ci);
                quota[m] = q;
            }
        }

        let league = Self {
            teams,
            conferences,
            conference_quota,
            conference_of,
            quota,
            games_per_team: games,
            cap: settings.max_meetings_per_pair,
        };
        league.check_non_conference()?;
        Ok(league)
    }

    /// Necessary conditions for filling every team's non-conference slots.
    fn check_non_conference(&self) -> Result<(), ScheduleError> {
        let n = self.teams.len() as u64;
        let cap = u64::from(self.cap);
        let need: Vec<u64> = (0..self.teams.len()).map(|t| u64::from(self.need(t))).collect();

        let total: u64 = need.iter().sum();
        if total % 2 == 1 {
            return Err(ScheduleError::OddNonConferenceSlots(total));
        }
        for (t, team) in self.teams.iter().enumerate() {
            let outside = match self.conference_of[t] {
                Some(ci) => n - self.conferences[ci].1.len() as u64,
                None => n.saturating_sub(1),
            };
            if need[t] > cap * outside {
                return Err(ScheduleError::NonConferenceInfeasible {
                    scope: format!("team {}", team.id),
                    needed: need[t],
                    available: cap * outside,
                });
            }
        }
        for (ci, (id, members)) in self.conferences.iter().enumerate() {
            let size = members.len() as u64;
            let needed: u64 = members.iter().map(|&m| need[m]).sum();
            let available: u64 = (0..self.teams.len())
                .filter(|&t| self.conference_of[t] != Some(ci))
                .map(|t| need[t].min(cap * size))
                .sum();
            if needed > available {
                return Err(ScheduleError::NonConferenceInfeasible {
                    scope: format!("conference {id}"),
                    needed,
                    available,
                });
            }
        }
        Ok(())
    }

    fn need(&self, team: usize) -> u32 {
        self.games_per_team - self.quota[team]
    }

    fn same_conference(&self, a: usize, b: usize) -> bool {
        self.conference_of[a].is_some() && self.conference_of[a] == self.conference_of[b]
    }

    fn eligible(&self, fill: &Fill, a: usize, b: usize) -> bool {
        a != b && !self.same_conference(a, b) && fill.met(a, b) < self.cap
    }

    /// Every matchup of the season, oriented home/away, without dates.
    fn pairings(&self, rng: &mut ChaCha8Rng) -> Option<Vec<Pairing>> {
        let mut pairings = Vec::new();
        for (ci, (_, members)) in self.conferences.iter().enumerate() {
            for (home, away) in circulant(members, self.conference_quota[ci], rng) {
                pairings.push(Pairing {
                    home,
                    away,
                    conference: Some(ci),
                });
            }
        }
        let edges = self.non_conference_edges(rng)?;
        orient(&mut pairings, edges, self.teams.len(), rng);
        Some(pairings)
    }

    /// Neediest team first, paired with the neediest eligible opponent it has
    /// met least often. Dead ends are repaired by swapping an existing game.
    fn non_conference_edges(&self, rng: &mut ChaCha8Rng) -> Option<Vec<(usize, usize)>> {
        let n = self.teams.len();
        let mut fill = Fill {
            need: (0..n).map(|t| self.need(t)).collect(),
            meetings: HashMap::new(),
            edges: Vec::new(),
        };
        while let Some(a) = fill.neediest(rng) {
            let partner = (0..n)
                .filter(|&b| fill.need[b] > 0 && self.eligible(&fill, a, b))
                .max_by_key(|&b| (fill.need[b], Reverse(fill.met(a, b)), rng.gen::<u32>()));
            match partner {
                Some(b) => fill.add(a, b),
                None => {
                    if !self.repair(&mut fill, a, rng) {
                        return None;
                    }
                }
            }
        }
        Some(fill.edges)
    }

    /// Free up a partner for `a` by replacing one existing game (x, y) with
    /// two games that involve `a`.
    fn repair(&self, fill: &mut Fill, a: usize, rng: &mut ChaCha8Rng) -> bool {
        let mut others: Vec<usize> = (0..self.teams.len())
            .filter(|&b| b != a && fill.need[b] > 0)
            .collect();
        others.shuffle(rng);
        let mut order: Vec<usize> = (0..fill.edges.len()).collect();
        order.shuffle(rng);

        for &b in &others {
            for &e in &order {
                let (x, y) = fill.edges[e];
                if x == a || y == a || x == b || y == b {
                    continue;
                }
                for (p, q) in [(x, y), (y, x)] {
                    if self.eligible(fill, a, p) && self.eligible(fill, b, q) {
                        fill.remove(e);
                        fill.add(a, p);
                        fill.add(b, q);
                        return true;
                    }
                }
            }
        }
        if fill.need[a] >= 2 {
            for &e in &order {
                let (x, y) = fill.edges[e];
                if x == a || y == a {
                    continue;
                }
                if self.eligible(fill, a, x) && self.eligible(fill, a, y) {
                    fill.remove(e);
                    fill.add(a, x);
                    fill.add(a, y);
                    return true;
                }
            }
        }
        false
    }

    fn build(
        &self,
        season_year: i32,
        anchors: &AnnualCalendar,
        pairings: &[Pairing],
        dates: &[CalendarDate],
    ) -> SeasonSchedule {
        let mut rows: Vec<(CalendarDate, &Pairing)> =
            dates.iter().copied().zip(pairings.iter()).collect();
        rows.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| self.teams[a.1.home].id.cmp(&self.teams[b.1.home].id))
        });

        let mut schedule =
            SeasonSchedule::new(season_year, anchors.season_start, anchors.regular_season_end);
        for (date, p) in rows {
            schedule.insert_game(
                date,
                self.teams[p.home].id.clone(),
                self.teams[p.away].id.clone(),
                p.conference.map(|ci| self.conferences[ci].0.clone()),
            );
        }
        schedule
    }
}

/// Working state of the non-conference fill.
struct Fill {
    need: Vec<u32>,
    meetings: HashMap<(usize, usize), u32>,
    edges: Vec<(usize, usize)>,
}

impl Fill {
    fn key(a: usize, b: usize) -> (usize, usize) {
        (a.min(b), a.max(b))
    }

    fn met(&self, a: usize, b: usize) -> u32 {
        self.meetings.get(&Self::key(a, b)).copied().unwrap_or(0)
    }

    fn neediest(&self, rng: &mut ChaCha8Rng) -> Option<usize> {
        (0..self.need.len())
            .filter(|&t| self.need[t] > 0)
            .max_by_key(|&t| (self.need[t], rng.gen::<u32>()))
    }

    fn add(&mut self, a: usize, b: usize) {
        self.need[a] -= 1;
        self.need[b] -= 1;
        *self.meetings.entry(Self::key(a, b)).or_insert(0) += 1;
        self.edges.push((a, b));
    }

    fn remove(&mut self, edge: usize) {
        let (a, b) = self.edges.swap_remove(edge);
        self.need[a] += 1;
        self.need[b] += 1;
        if let Some(m) = self.meetings.get_mut(&Self::key(a, b)) {
            *m = m.saturating_sub(1);
        }
    }
}

/// `quota`-regular circulant graph over a shuffled conference.
///
/// Offsets 1..=quota/2 give every team one home and one away game each; an
/// odd quota (only valid for an even conference) adds the half-way offset,
/// alternating home sides.
fn circulant(members: &[usize], quota: u32, rng: &mut ChaCha8Rng) -> Vec<(usize, usize)> {
    let mut order = members.to_vec();
    order.shuffle(rng);
    let n = order.len();
    let q = quota as usize;
    let mut out = Vec::with_capacity(n * q / 2);
    if n < 2 || q == 0 {
        return out;
    }
    for offset in 1..=q / 2 {
        for i in 0..n {
            out.push((order[i], order[(i + offset) % n]));
        }
    }
    if q % 2 == 1 {
        let half = n / 2;
        for i in 0..half {
            let (a, b) = (order[i], order[i + half]);
            out.push(if i % 2 == 0 { (a, b) } else { (b, a) });
        }
    }
    out
}

/// Give each non-conference game a home side, favouring the team with the
/// larger away surplus, then flip games while doing so narrows the gap.
fn orient(
    pairings: &mut Vec<Pairing>,
    mut edges: Vec<(usize, usize)>,
    teams: usize,
    rng: &mut ChaCha8Rng,
) {
    let mut diff = vec![0i32; teams];
    for p in pairings.iter() {
        diff[p.home] += 1;
        diff[p.away] -= 1;
    }
    edges.shuffle(rng);
    let mut oriented: Vec<(usize, usize)> = edges
        .into_iter()
        .map(|(a, b)| {
            let a_home = diff[a] < diff[b] || (diff[a] == diff[b] && rng.gen_bool(0.5));
            let (home, away) = if a_home { (a, b) } else { (b, a) };
            diff[home] += 1;
            diff[away] -= 1;
            (home, away)
        })
        .collect();

    for _ in 0..ORIENT_PASSES {
        let mut improved = false;
        for game in oriented.iter_mut() {
            let (home, away) = *game;
            if diff[home] - diff[away] > 2 {
                diff[home] -= 2;
                diff[away] += 2;
                *game = (away, home);
                improved = true;
            }
        }
        if !improved {
            break;
        }
    }

    pairings.extend(oriented.into_iter().map(|(home, away)| Pairing {
        home,
        away,
        conference: None,
    }));
}

/// Playable days of the regular season.
struct Window {
    start: CalendarDate,
    open: Vec<bool>,
    conference_from: usize,
}

impl Window {
    fn new(anchors: &AnnualCalendar, settings: &ScheduleSettings) -> Self {
        let (start, end) = anchors.playing_window();
        let open: Vec<bool> = CalendarDate::range_inclusive(start, end)
            .map(|d| !settings.is_blackout(d))
            .collect();
        let conference_from = anchors
            .conference_play_start
            .diff_days(start)
            .clamp(0, open.len() as i32) as usize;
        Self {
            start,
            open,
            conference_from,
        }
    }

    fn open_days(&self) -> usize {
        self.open.iter().filter(|o| **o).count()
    }

    /// Greedy date per game: any day free for both teams, preferring quiet
    /// days, rest between a team's games and the right part of the season.
    /// With at least `2 * games_per_team - 1` open days a free day always
    /// exists; below that the attempt may fail and is retried.
    fn assign(
        &self,
        teams: usize,
        pairings: &[Pairing],
        rng: &mut ChaCha8Rng,
    ) -> Option<Vec<CalendarDate>> {
        let days = self.open.len();
        let mut busy = vec![vec![false; days]; teams];
        let mut load = vec![0u32; days];
        let target = (pairings.len() as f64 / self.open_days().max(1) as f64).max(1.0);

        let mut order: Vec<usize> = (0..pairings.len()).collect();
        order.shuffle(rng);
        let mut dates = vec![self.start; pairings.len()];
        for i in order {
            let p = pairings[i];
            let mut best: Option<(f64, usize)> = None;
            for d in 0..days {
                if !self.open[d] || busy[p.home][d] || busy[p.away][d] {
                    continue;
                }
                let mut score = f64::from(load[d]) / target;
                score += crowding(&busy[p.home], d) + crowding(&busy[p.away], d);
                if p.conference.is_some() != (d >= self.conference_from) {
                    score += PHASE_PENALTY;
                }
                score += rng.gen::<f64>() * JITTER;
                if best.map_or(true, |(s, _)| score < s) {
                    best = Some((score, d));
                }
            }
            let (_, d) = best?;
            busy[p.home][d] = true;
            busy[p.away][d] = true;
            load[d] += 1;
            dates[i] = self.start.add_days(d as i32);
        }
        Some(dates)
    }
}

fn crowding(busy: &[bool], day: usize) -> f64 {
    let mut penalty = 0.0;
    for (k, weight) in CROWDING.iter().enumerate() {
        let gap = k + 1;
        if day >= gap && busy[day - gap] {
            penalty += weight;
        }
        if busy.get(day + gap).copied().unwrap_or(false) {
            penalty += weight;
        }
    }
    penalty
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use season_core::{build_annual_calendar, TeamId};

    fn league(conferences: &[(&str, usize)], independents: usize) -> Vec<Team> {
        let mut teams = Vec::new();
        for (name, size) in conferences {
            for i in 0..*size {
                teams.push(Team::new(format!("{name}-{i}"), Some(name), (i * 7 % 100) as u32));
            }
        }
        for i in 0..independents {
            teams.push(Team::new(format!("Ind-{i}"), None, 50));
        }
        teams
    }

    fn settings(games: u32, quotas: &[(&str, u32)], seed: u64) -> ScheduleSettings {
        ScheduleSettings {
            games_per_team: games,
            conference_quotas: quotas
                .iter()
                .map(|(c, q)| (ConferenceId::from(*c), *q))
                .collect(),
            rng_seed: seed,
            ..ScheduleSettings::default()
        }
    }

    fn counts(schedule: &SeasonSchedule, team: &TeamId) -> (usize, usize, i32) {
        let games: Vec<_> = schedule.team_schedule(team).collect();
        let conference = games.iter().filter(|g| g.is_conference_game()).count();
        let home = games.iter().filter(|g| &g.home == team).count() as i32;
        (games.len(), conference, 2 * home - games.len() as i32)
    }

    #[test]
    fn forty_teams_two_conferences() {
        let cal = build_annual_calendar(2025);
        let teams = league(&[("ConfA", 20), ("ConfB", 20)], 0);
        let mut s = settings(31, &[("ConfA", 6), ("ConfB", 6)], 42);
        s.blackout_dates = vec![
            "2025-12-24".parse().unwrap(),
            "2025-12-25".parse().unwrap(),
        ];
        let schedule = generate(2025, &teams, &s, &cal).unwrap();
        assert_eq!(validate(&schedule, &teams, &s), Vec::<String>::new());
        assert_eq!(schedule.len(), 40 * 31 / 2);

        let mut total_imbalance = 0;
        for team in &teams {
            let (total, conference, imbalance) = counts(&schedule, &team.id);
            assert_eq!(total, 31, "{}", team.id);
            assert_eq!(conference, 6, "{}", team.id);
            assert!(imbalance.abs() <= 5, "{} imbalance {}", team.id, imbalance);
            total_imbalance += imbalance.abs();
        }
        assert!(total_imbalance as f64 / teams.len() as f64 <= 2.0);
        for game in schedule.games() {
            assert!(!s.blackout_dates.contains(&game.date));
            assert!(cal.is_in_playing_window(game.date));
        }
    }

    #[test]
    fn same_seed_same_schedule() {
        let cal = build_annual_calendar(2025);
        let teams = league(&[("East", 8), ("West", 8)], 0);
        let s = settings(14, &[("East", 4), ("West", 4)], 7);
        let a = generate(2025, &teams, &s, &cal).unwrap();
        let b = generate(2025, &teams, &s, &cal).unwrap();
        assert_eq!(a, b);
        let c = generate(2025, &teams, &settings(14, &[("East", 4), ("West", 4)], 8), &cal)
            .unwrap();
        assert_ne!(a.games(), c.games());
    }

    #[test]
    fn independents_and_uneven_conferences() {
        let cal = build_annual_calendar(2026);
        let teams = league(&[("North", 6), ("South", 7), ("Coast", 5)], 2);
        let s = settings(12, &[("North", 5), ("South", 6), ("Coast", 4)], 11);
        let schedule = generate(2026, &teams, &s, &cal).unwrap();
        assert!(validate(&schedule, &teams, &s).is_empty());
        for game in schedule.games() {
            let ind = game.home.0.starts_with("Ind") || game.away.0.starts_with("Ind");
            if ind {
                assert!(game.conference.is_none());
            }
        }
    }

    #[test]
    fn rejects_quota_not_below_conference_size() {
        let cal = build_annual_calendar(2025);
        let teams = league(&[("Tiny", 4), ("Big", 10)], 0);
        let err = generate(2025, &teams, &settings(10, &[("Tiny", 4), ("Big", 4)], 1), &cal)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::QuotaTooLarge { quota: 4, size: 4, .. }));
    }

    #[test]
    fn rejects_odd_quota_in_odd_conference() {
        let cal = build_annual_calendar(2025);
        let teams = league(&[("Odd", 5), ("Even", 6)], 0);
        let err = generate(2025, &teams, &settings(8, &[("Odd", 3)], 1), &cal).unwrap_err();
        assert!(matches!(err, ScheduleError::OddConference { .. }));
    }

    #[test]
    fn rejects_more_games_than_dates() {
        let cal = build_annual_calendar(2025);
        let teams = league(&[("A", 10), ("B", 10)], 0);
        let err = generate(2025, &teams, &settings(200, &[], 1), &cal).unwrap_err();
        assert!(matches!(err, ScheduleError::NotEnoughDates { games: 200, .. }));
    }

    #[test]
    fn rejects_unabsorbable_non_conference_need() {
        let cal = build_annual_calendar(2025);
        // Ten teams need ten outside games each; four outsiders can take at most eight each.
        let teams = league(&[("Large", 10), ("Small", 4)], 0);
        let err = generate(2025, &teams, &settings(12, &[("Large", 2), ("Small", 2)], 1), &cal)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::NonConferenceInfeasible { .. }));
    }

    #[test]
    fn rejects_duplicate_teams_and_zero_cap() {
        let cal = build_annual_calendar(2025);
        let mut teams = league(&[("A", 4)], 0);
        teams.push(teams[0].clone());
        assert!(matches!(
            generate(2025, &teams, &settings(2, &[], 1), &cal),
            Err(ScheduleError::DuplicateTeam(_))
        ));
        let mut s = settings(2, &[], 1);
        s.max_meetings_per_pair = 0;
        assert!(matches!(
            generate(2025, &league(&[("A", 4)], 0), &s, &cal),
            Err(ScheduleError::InvalidSettings(_))
        ));
    }

    #[test]
    fn dense_window_can_exhaust_attempts() {
        let cal = build_annual_calendar(2025);
        // A triangle of teams needs three dates; only two are open.
        let teams = league(&[], 3);
        let mut s = settings(2, &[], 5);
        s.max_attempts = 4;
        let (start, end) = cal.playing_window();
        s.blackout_dates = CalendarDate::range_inclusive(start.add_days(2), end).collect();
        assert_eq!(
            generate(2025, &teams, &s, &cal),
            Err(ScheduleError::Exhausted { attempts: 4 })
        );
    }

    #[test]
    fn empty_league_yields_empty_schedule() {
        let cal = build_annual_calendar(2025);
        let schedule = generate(2025, &[], &ScheduleSettings::default(), &cal).unwrap();
        assert!(schedule.is_empty());
    }

    #[test]
    fn circulant_is_regular_and_balanced() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for (n, q) in [(4usize, 3u32), (5, 4), (6, 3), (9, 2), (10, 9)] {
            let members: Vec<usize> = (0..n).collect();
            let edges = circulant(&members, q, &mut rng);
            let mut degree = vec![0u32; n];
            let mut home = vec![0i32; n];
            let mut pairs = HashSet::new();
            for (h, a) in &edges {
                degree[*h] += 1;
                degree[*a] += 1;
                home[*h] += 1;
                assert!(pairs.insert((*h.min(a), *h.max(a))), "repeat pair in n={n} q={q}");
            }
            assert!(degree.iter().all(|d| *d == q), "n={n} q={q}");
            for h in home {
                assert!((2 * h - q as i32).abs() <= 1);
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn generated_schedules_always_validate(
            conferences in 2usize..4,
            size in 4usize..11,
            quota_seed in 0u32..10,
            extra in 0u32..6,
            seed in 0u64..1_000,
        ) {
            let mut quota = quota_seed % size as u32;
            if size % 2 == 1 && quota % 2 == 1 {
                quota -= 1;
            }
            let mut non_conference = extra.min(size as u32);
            if (conferences * size) % 2 == 1 && non_conference % 2 == 1 {
                non_conference -= 1;
            }
            let names = ["Alpha", "Bravo", "Charlie"];
            let layout: Vec<(&str, usize)> =
                names[..conferences].iter().map(|n| (*n, size)).collect();
            let teams = league(&layout, 0);
            let quotas: Vec<(&str, u32)> =
                names[..conferences].iter().map(|n| (*n, quota)).collect();
            let s = settings(quota + non_conference, &quotas, seed);
            let cal = build_annual_calendar(2025);
            let schedule = generate(2025, &teams, &s, &cal).unwrap();
            prop_assert_eq!(validate(&schedule, &teams, &s), Vec::<String>::new());
            for team in &teams {
                let (total, in_conf, _) = counts(&schedule, &team.id);
                prop_assert_eq!(total as u32, quota + non_conference);
                prop_assert_eq!(in_conf as u32, quota);
            }
        }
    }
}
