#![deny(warnings)]

//! Single-elimination national tournament.
//!
//! A 68-team field: four First Four play-in games feed the 16-seed lines of
//! four 16-team regions, whose winners meet in the Final Four and the
//! Championship. Later rounds are materialized only once every matchup
//! feeding them has been played; see [`Tournament::advance_stage`].

mod advance;

pub use advance::{MatchupResult, StageReport};

use season_core::{GameScore, Standings, Team, TeamId, TournamentStage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Full field size.
pub const FIELD_SIZE: usize = 68;
/// Teams seeded directly into the regions (seed lines 1..=15).
pub const DIRECT_SEEDS: usize = 60;
pub const REGION_NAMES: [&str; 4] = ["East", "West", "South", "Midwest"];
/// Seed pairings of a region's Round of 64, top of the bracket first.
pub const ROUND_OF_64_SEEDS: [(u8, u8); 8] = [
    (1, 16),
    (8, 9),
    (5, 12),
    (4, 13),
    (6, 11),
    (3, 14),
    (7, 10),
    (2, 15),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchupId(pub u32);

impl fmt::Display for MatchupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One side of a matchup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BracketSlot {
    Resolved(TeamId),
    /// Filled by the winner of another matchup once it is played.
    Pending(MatchupId),
    /// No team available; loses by forfeit.
    Empty,
}

impl BracketSlot {
    pub fn team(&self) -> Option<&TeamId> {
        match self {
            BracketSlot::Resolved(team) => Some(team),
            _ => None,
        }
    }

    fn from_winner(winner: Option<TeamId>) -> Self {
        winner.map_or(BracketSlot::Empty, BracketSlot::Resolved)
    }
}

impl fmt::Display for BracketSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketSlot::Resolved(team) => write!(f, "{team}"),
            BracketSlot::Pending(id) => write!(f, "Winner of {id}"),
            BracketSlot::Empty => f.write_str("(bye)"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentMatchup {
    /// Unique within the tournament, assigned in creation order.
    pub id: MatchupId,
    pub stage: TournamentStage,
    /// Region the matchup belongs to (or feeds, for the First Four).
    pub region: Option<String>,
    /// Upper side of the bracket line; hosts the game.
    pub home: BracketSlot,
    pub away: BracketSlot,
    /// Seed line of the home side, if known.
    pub home_seed: Option<u8>,
    pub away_seed: Option<u8>,
    /// `None` for forfeits.
    pub score: Option<GameScore>,
    /// `None` once played means both sides were empty.
    pub winner: Option<TeamId>,
    /// Set once; never reset.
    pub played: bool,
}

impl TournamentMatchup {
    /// Round number across the whole tournament, First Four = 0.
    pub fn round(&self) -> u8 {
        self.stage.round_number()
    }

    /// Seed carried forward by the winner.
    pub fn winner_seed(&self) -> Option<u8> {
        let winner = self.winner.as_ref()?;
        if self.home.team() == Some(winner) {
            self.home_seed
        } else {
            self.away_seed
        }
    }

    fn render(&self) -> String {
        let side = |slot: &BracketSlot, seed: Option<u8>| match seed {
            Some(seed) => format!("({seed}) {slot}"),
            None => slot.to_string(),
        };
        let home = side(&self.home, self.home_seed);
        let away = side(&self.away, self.away_seed);
        let region = self
            .region
            .as_deref()
            .map(|r| format!("[{r}] "))
            .unwrap_or_default();
        match (&self.score, self.played) {
            (Some(s), true) => format!("{} {region}{home} {}-{} {away}", self.id, s.home, s.away),
            (None, true) => format!(
                "{} {region}{home} vs {away}, advances: {}",
                self.id,
                self.winner.as_ref().map_or("nobody".to_string(), |w| w.to_string())
            ),
            _ => format!("{} {region}{home} vs {away}", self.id),
        }
    }
}

/// One region: rounds of the region in order, Round of 64 first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub rounds: Vec<Vec<TournamentMatchup>>,
}

impl Region {
    /// Winner of the Elite Eight, once played.
    pub fn champion(&self) -> Option<Option<&TeamId>> {
        if self.rounds.len() < 4 {
            return None;
        }
        let last = self.rounds.last()?;
        let game = last.first()?;
        game.played.then_some(game.winner.as_ref())
    }
}

/// A ranked tournament candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketEntrant {
    pub team: TeamId,
    pub wins: u32,
    pub prestige: u32,
}

/// Entrants for every team, with wins taken from `standings`.
pub fn entrants_from(teams: &[Team], standings: &Standings) -> Vec<BracketEntrant> {
    teams
        .iter()
        .map(|t| BracketEntrant {
            team: t.id.clone(),
            wins: standings.wins(&t.id),
            prestige: t.prestige,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub first_four: Vec<TournamentMatchup>,
    /// Regions in bracket order; the Final Four pairs 0 v 1 and 2 v 3.
    pub regions: Vec<Region>,
    pub final_four: Vec<TournamentMatchup>,
    pub championship: Option<TournamentMatchup>,
    pub champion: Option<TeamId>,
    next_id: u32,
}

impl Tournament {
    /// Seed and lay out the field.
    ///
    /// Entrants are ranked by wins, then prestige, then name. The top 60 fill
    /// seed lines 1..=15, snaking across the regions; the next 8 meet in the
    /// First Four (61 v 68, 62 v 67, ...) for the 16 seeds. Missing teams leave
    /// `Empty` slots, surplus entrants are left out.
    pub fn create(entrants: &[BracketEntrant]) -> Self {
        let mut ranked: Vec<&BracketEntrant> = entrants.iter().collect();
        ranked.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then(b.prestige.cmp(&a.prestige))
                .then_with(|| a.team.cmp(&b.team))
        });
        let at = |rank: usize| {
            ranked
                .get(rank)
                .map_or(BracketSlot::Empty, |e| BracketSlot::Resolved(e.team.clone()))
        };

        let mut tournament = Self {
            first_four: Vec::new(),
            regions: Vec::new(),
            final_four: Vec::new(),
            championship: None,
            champion: None,
            next_id: 0,
        };

        // lines[region][seed - 1]
        let mut lines: Vec<Vec<BracketSlot>> = vec![vec![BracketSlot::Empty; 16]; 4];
        for rank in 0..DIRECT_SEEDS {
            let line = rank / 4;
            let pos = rank % 4;
            let region = if line % 2 == 0 { pos } else { 3 - pos };
            lines[region][line] = at(rank);
        }
        for (region, slots) in lines.iter_mut().enumerate() {
            let hi = DIRECT_SEEDS + region;
            let lo = FIELD_SIZE - 1 - region;
            let id = tournament.push_id();
            tournament.first_four.push(TournamentMatchup {
                id,
                stage: TournamentStage::FirstFour,
                region: Some(REGION_NAMES[region].to_string()),
                home: at(hi),
                away: at(lo),
                home_seed: Some(16),
                away_seed: Some(16),
                score: None,
                winner: None,
                played: false,
            });
            slots[15] = BracketSlot::Pending(id);
        }

        for (region, slots) in lines.into_iter().enumerate() {
            let name = REGION_NAMES[region].to_string();
            let round: Vec<TournamentMatchup> = ROUND_OF_64_SEEDS
                .iter()
                .map(|&(hi, lo)| {
                    tournament.matchup(
                        TournamentStage::RoundOf64,
                        Some(name.as_str()),
                        (slots[usize::from(hi) - 1].clone(), Some(hi)),
                        (slots[usize::from(lo) - 1].clone(), Some(lo)),
                    )
                })
                .collect();
            tournament.regions.push(Region {
                name,
                rounds: vec![round],
            });
        }

        info!(
            entrants = entrants.len(),
            seeded = ranked.len().min(FIELD_SIZE),
            "tournament bracket created"
        );
        tournament
    }

    fn push_id(&mut self) -> MatchupId {
        let id = MatchupId(self.next_id);
        self.next_id += 1;
        id
    }

    fn matchup(
        &mut self,
        stage: TournamentStage,
        region: Option<&str>,
        home: (BracketSlot, Option<u8>),
        away: (BracketSlot, Option<u8>),
    ) -> TournamentMatchup {
        TournamentMatchup {
            id: self.push_id(),
            stage,
            region: region.map(str::to_string),
            home: home.0,
            away: away.0,
            home_seed: home.1,
            away_seed: away.1,
            score: None,
            winner: None,
            played: false,
        }
    }

    /// Every materialized matchup, earliest stage first.
    pub fn matchups(&self) -> impl Iterator<Item = &TournamentMatchup> + '_ {
        let region_rounds = (0..4).flat_map(move |r| {
            self.regions
                .iter()
                .filter_map(move |region| region.rounds.get(r))
                .flatten()
        });
        self.first_four
            .iter()
            .chain(region_rounds)
            .chain(self.final_four.iter())
            .chain(self.championship.iter())
    }

    pub fn find_matchup(&self, id: MatchupId) -> Option<&TournamentMatchup> {
        self.matchups().find(|m| m.id == id)
    }

    /// Earliest stage with an unplayed matchup; `None` once the Championship
    /// has been played.
    pub fn current_stage(&self) -> Option<TournamentStage> {
        self.matchups().find(|m| !m.played).map(|m| m.stage)
    }

    pub fn is_complete(&self) -> bool {
        self.championship.as_ref().is_some_and(|m| m.played)
    }

    /// Human-readable rows per stage.
    pub fn render_state(&self) -> BTreeMap<TournamentStage, Vec<String>> {
        let mut rows: BTreeMap<TournamentStage, Vec<String>> = BTreeMap::new();
        for m in self.matchups() {
            rows.entry(m.stage).or_default().push(m.render());
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    pub(crate) fn field(n: usize) -> Vec<BracketEntrant> {
        (0..n)
            .map(|i| BracketEntrant {
                team: TeamId::from(format!("T{i:02}")),
                wins: (100 - i) as u32,
                prestige: 0,
            })
            .collect()
    }

    fn seed_of(t: &Tournament, team: &str) -> Option<(String, u8)> {
        let id = TeamId::from(team);
        for region in &t.regions {
            for m in &region.rounds[0] {
                if m.home.team() == Some(&id) {
                    return Some((region.name.clone(), m.home_seed?));
                }
                if m.away.team() == Some(&id) {
                    return Some((region.name.clone(), m.away_seed?));
                }
            }
        }
        None
    }

    #[test]
    fn full_field_layout() {
        let t = Tournament::create(&field(68));
        assert_eq!(t.first_four.len(), 4);
        assert_eq!(t.regions.len(), 4);
        assert!(t.regions.iter().all(|r| r.rounds.len() == 1 && r.rounds[0].len() == 8));
        assert_eq!(t.current_stage(), Some(TournamentStage::FirstFour));
        assert!(t.champion.is_none());

        // Top four are the 1 seeds; line two snakes back.
        assert_eq!(seed_of(&t, "T00"), Some(("East".into(), 1)));
        assert_eq!(seed_of(&t, "T03"), Some(("Midwest".into(), 1)));
        assert_eq!(seed_of(&t, "T04"), Some(("Midwest".into(), 2)));
        assert_eq!(seed_of(&t, "T07"), Some(("East".into(), 2)));
        assert_eq!(seed_of(&t, "T59").map(|s| s.1), Some(15));

        let ff = &t.first_four[0];
        assert_eq!(ff.home, BracketSlot::Resolved(TeamId::from("T60")));
        assert_eq!(ff.away, BracketSlot::Resolved(TeamId::from("T67")));
        assert_eq!(t.regions[0].rounds[0][0].away, BracketSlot::Pending(ff.id));

        let ids: HashSet<_> = t.matchups().map(|m| m.id).collect();
        assert_eq!(ids.len(), 4 + 32);
        let mut teams = HashSet::new();
        for m in t.matchups() {
            teams.extend(m.home.team().cloned());
            teams.extend(m.away.team().cloned());
        }
        assert_eq!(teams.len(), 68);
    }

    #[test]
    fn ranking_uses_prestige_then_name() {
        let entrants = vec![
            BracketEntrant { team: TeamId::from("Zed"), wins: 20, prestige: 50 },
            BracketEntrant { team: TeamId::from("Abe"), wins: 20, prestige: 50 },
            BracketEntrant { team: TeamId::from("Top"), wins: 20, prestige: 90 },
            BracketEntrant { team: TeamId::from("Best"), wins: 25, prestige: 0 },
        ];
        let t = Tournament::create(&entrants);
        let firsts: Vec<_> = t.regions.iter().map(|r| r.rounds[0][0].home.clone()).collect();
        assert_eq!(
            firsts,
            vec![
                BracketSlot::Resolved(TeamId::from("Best")),
                BracketSlot::Resolved(TeamId::from("Top")),
                BracketSlot::Resolved(TeamId::from("Abe")),
                BracketSlot::Resolved(TeamId::from("Zed")),
            ]
        );
        assert_eq!(t.regions[0].rounds[0][1].home, BracketSlot::Empty);
    }

    #[test]
    fn surplus_entrants_are_left_out() {
        let t = Tournament::create(&field(80));
        let seeded = t
            .matchups()
            .flat_map(|m| [m.home.team(), m.away.team()])
            .flatten()
            .count();
        assert_eq!(seeded, 68);
        assert_eq!(seed_of(&t, "T70"), None);
    }

    #[test]
    fn render_lists_every_stage_present() {
        let t = Tournament::create(&field(68));
        let rows = t.render_state();
        assert_eq!(rows[&TournamentStage::FirstFour].len(), 4);
        assert_eq!(rows[&TournamentStage::RoundOf64].len(), 32);
        assert!(rows[&TournamentStage::RoundOf64][0].contains("(1) T00 vs (16) Winner of #0"));
        assert!(!rows.contains_key(&TournamentStage::RoundOf32));
    }

    #[test]
    fn entrants_take_wins_from_standings() {
        let teams = vec![Team::new("A", None, 5), Team::new("B", None, 9)];
        let mut standings = Standings::default();
        standings.records.entry(TeamId::from("A")).or_default().wins = 12;
        let entrants = entrants_from(&teams, &standings);
        assert_eq!(entrants[0].wins, 12);
        assert_eq!(entrants[1].wins, 0);
        assert_eq!(entrants[1].prestige, 9);
    }
}
