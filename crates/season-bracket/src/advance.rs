use crate::{BracketSlot, Tournament, TournamentMatchup};
use season_core::{GameScore, OutcomeSimulator, TeamId, TournamentStage};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

const CONTEXT_SALT: u64 = 0x7A3D_C0DE_B4AC_E7E5;

/// Outcome of one resolved matchup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupResult {
    pub id: crate::MatchupId,
    pub stage: TournamentStage,
    pub region: Option<String>,
    pub winner: Option<TeamId>,
    pub loser: Option<TeamId>,
    pub score: Option<GameScore>,
    /// Decided without playing: at least one side was empty or unresolved.
    pub forfeit: bool,
}

/// What one call to [`Tournament::advance_stage`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Option<TournamentStage>,
    pub results: Vec<MatchupResult>,
    /// Set by the call that played the Championship.
    pub champion: Option<TeamId>,
}

impl StageReport {
    pub fn is_noop(&self) -> bool {
        self.results.is_empty()
    }
}

impl Tournament {
    /// Play every unplayed matchup of the earliest incomplete stage, then
    /// materialize whatever that unlocks.
    ///
    /// Calling this on a finished tournament returns an empty report and
    /// leaves the bracket untouched.
    pub fn advance_stage<O>(&mut self, outcome: &mut O) -> StageReport
    where
        O: OutcomeSimulator + ?Sized,
    {
        let Some(stage) = self.current_stage() else {
            debug!("tournament already decided, nothing to advance");
            return StageReport::default();
        };

        let results: Vec<MatchupResult> = self
            .stage_matchups_mut(stage)
            .into_iter()
            .filter(|m| !m.played)
            .map(|m| play(m, &mut *outcome))
            .collect();
        let crowned = self.champion.is_none();
        self.materialize();

        let champion = if crowned { self.champion.clone() } else { None };
        info!(
            stage = stage.label(),
            games = results.len(),
            forfeits = results.iter().filter(|r| r.forfeit).count(),
            "tournament stage played"
        );
        if let Some(team) = &champion {
            info!(champion = %team, "national champion crowned");
        }
        StageReport {
            stage: Some(stage),
            results,
            champion,
        }
    }

    fn stage_matchups_mut(&mut self, stage: TournamentStage) -> Vec<&mut TournamentMatchup> {
        match stage {
            TournamentStage::FirstFour => self.first_four.iter_mut().collect(),
            TournamentStage::FinalFour => self.final_four.iter_mut().collect(),
            TournamentStage::Championship => self.championship.iter_mut().collect(),
            _ => {
                let Some(round) = stage.region_round() else {
                    return Vec::new();
                };
                self.regions
                    .iter_mut()
                    .filter_map(|r| r.rounds.get_mut(round - 1))
                    .flatten()
                    .collect()
            }
        }
    }

    /// Create every matchup whose feeders are all played.
    fn materialize(&mut self) {
        let decided: Vec<_> = self
            .first_four
            .iter()
            .filter(|m| m.played)
            .map(|m| (BracketSlot::Pending(m.id), m.winner.clone()))
            .collect();
        for region in &mut self.regions {
            for m in region.rounds.iter_mut().flatten() {
                for slot in [&mut m.home, &mut m.away] {
                    if let Some((_, winner)) = decided.iter().find(|(pending, _)| pending == slot) {
                        *slot = BracketSlot::from_winner(winner.clone());
                    }
                }
            }
        }

        for i in 0..self.regions.len() {
            let region = &self.regions[i];
            let Some(last) = region.rounds.last() else {
                continue;
            };
            if last.iter().any(|m| !m.played) {
                continue;
            }
            let Some(stage) = TournamentStage::from_region_round(region.rounds.len() + 1) else {
                continue;
            };
            let name = region.name.clone();
            let pairs = winners_in_pairs(last);
            let next: Vec<TournamentMatchup> = pairs
                .into_iter()
                .map(|(home, away)| self.matchup(stage, Some(name.as_str()), home, away))
                .collect();
            self.regions[i].rounds.push(next);
        }

        if self.final_four.is_empty() && !self.regions.is_empty() {
            let elite: Option<Vec<TournamentMatchup>> = self
                .regions
                .iter()
                .map(|r| r.rounds.get(3).and_then(|round| round.first()).cloned())
                .collect();
            if let Some(elite) = elite.filter(|games| games.iter().all(|m| m.played)) {
                let semifinals: Vec<TournamentMatchup> = winners_in_pairs(&elite)
                    .into_iter()
                    .map(|(home, away)| self.matchup(TournamentStage::FinalFour, None, home, away))
                    .collect();
                self.final_four = semifinals;
            }
        }

        if self.championship.is_none()
            && !self.final_four.is_empty()
            && self.final_four.iter().all(|m| m.played)
        {
            let pair = winners_in_pairs(&self.final_four).into_iter().next();
            if let Some((home, away)) = pair {
                let title = self.matchup(TournamentStage::Championship, None, home, away);
                self.championship = Some(title);
            }
        }

        if self.champion.is_none() {
            if let Some(title) = self.championship.as_ref().filter(|m| m.played) {
                self.champion = title.winner.clone();
            }
        }
    }
}

type Advancer = (BracketSlot, Option<u8>);

/// Winners of consecutive matchups paired up, top one at home.
fn winners_in_pairs(games: &[TournamentMatchup]) -> Vec<(Advancer, Advancer)> {
    let advancer =
        |m: &TournamentMatchup| (BracketSlot::from_winner(m.winner.clone()), m.winner_seed());
    games
        .chunks(2)
        .map(|pair| {
            let home = advancer(&pair[0]);
            let away = pair.get(1).map_or((BracketSlot::Empty, None), advancer);
            (home, away)
        })
        .collect()
}

fn context_seed(m: &TournamentMatchup) -> u64 {
    u64::from(m.id.0).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ CONTEXT_SALT
}

/// Resolve one matchup. Sides without a team forfeit; the collaborator is
/// only asked about real games. Ties go to the better seed, then home.
pub(crate) fn play<O>(m: &mut TournamentMatchup, outcome: &mut O) -> MatchupResult
where
    O: OutcomeSimulator + ?Sized,
{
    let (winner, loser, score) = match (m.home.team(), m.away.team()) {
        (Some(home), Some(away)) => {
            let score = outcome.simulate(home, away, context_seed(m));
            let home_wins = match score.home.cmp(&score.away) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => m.home_seed.unwrap_or(u8::MAX) <= m.away_seed.unwrap_or(u8::MAX),
            };
            if home_wins {
                (Some(home.clone()), Some(away.clone()), Some(score))
            } else {
                (Some(away.clone()), Some(home.clone()), Some(score))
            }
        }
        (Some(home), None) => (Some(home.clone()), None, None),
        (None, Some(away)) => (Some(away.clone()), None, None),
        (None, None) => (None, None, None),
    };
    if matches!(m.home, BracketSlot::Pending(_)) || matches!(m.away, BracketSlot::Pending(_)) {
        debug!(matchup = m.id.0, "unresolved feeder, side forfeits");
    }

    m.played = true;
    m.score = score;
    m.winner = winner.clone();
    MatchupResult {
        id: m.id,
        stage: m.stage,
        region: m.region.clone(),
        winner,
        loser,
        score,
        forfeit: score.is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::field;
    use crate::MatchupId;
    use proptest::prelude::*;

    fn home_wins(_: &TeamId, _: &TeamId, _: u64) -> GameScore {
        GameScore { home: 70, away: 60 }
    }

    #[test]
    fn home_team_always_winning_takes_seven_stages() {
        let mut t = Tournament::create(&field(68));
        let mut outcome = home_wins;
        let expected = [
            (TournamentStage::FirstFour, 4),
            (TournamentStage::RoundOf64, 32),
            (TournamentStage::RoundOf32, 16),
            (TournamentStage::Sweet16, 8),
            (TournamentStage::Elite8, 4),
            (TournamentStage::FinalFour, 2),
            (TournamentStage::Championship, 1),
        ];
        for (call, (stage, games)) in expected.into_iter().enumerate() {
            assert!(t.champion.is_none(), "champion before call {call}");
            let report = t.advance_stage(&mut outcome);
            assert_eq!(report.stage, Some(stage));
            assert_eq!(report.results.len(), games);
            assert!(report.results.iter().all(|r| !r.forfeit));
        }
        assert_eq!(t.champion, Some(TeamId::from("T00")));
        assert!(t.is_complete());
        assert_eq!(t.current_stage(), None);

        let before = t.clone();
        let report = t.advance_stage(&mut outcome);
        assert!(report.is_noop());
        assert_eq!(report.stage, None);
        assert_eq!(t, before);
    }

    #[test]
    fn rounds_appear_only_after_feeders_finish() {
        let mut t = Tournament::create(&field(68));
        let mut outcome = home_wins;
        t.advance_stage(&mut outcome);
        assert!(t.regions.iter().all(|r| r.rounds.len() == 1));
        assert!(t.regions[0].rounds[0][0].away.team().is_some());
        t.advance_stage(&mut outcome);
        assert!(t.regions.iter().all(|r| r.rounds.len() == 2));
        assert!(t.final_four.is_empty());
        for _ in 0..3 {
            t.advance_stage(&mut outcome);
        }
        assert_eq!(t.final_four.len(), 2);
        assert!(t.championship.is_none());
        let ff = &t.final_four[0];
        assert_eq!(ff.home_seed, Some(1));
        assert_eq!(ff.home.team(), Some(&TeamId::from("T00")));
        assert_eq!(ff.away.team(), Some(&TeamId::from("T01")));
    }

    #[test]
    fn small_field_forfeits_and_still_crowns() {
        let mut t = Tournament::create(&field(10));
        let mut calls = 0;
        {
            let mut counting = |_: &TeamId, _: &TeamId, _: u64| {
                calls += 1;
                GameScore { home: 60, away: 50 }
            };
            for _ in 0..7 {
                t.advance_stage(&mut counting);
            }
        }
        assert_eq!(t.champion, Some(TeamId::from("T00")));
        // Two Sweet 16 games, four Elite Eight, two semifinals, the final.
        assert_eq!(calls, 9);
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(TeamId, TeamId)>,
    }

    impl OutcomeSimulator for Recorder {
        fn simulate(&mut self, home: &TeamId, away: &TeamId, _: u64) -> GameScore {
            self.calls.push((home.clone(), away.clone()));
            GameScore { home: 71, away: 64 }
        }
    }

    #[test]
    fn dangling_pending_reference_is_a_forfeit() {
        let mut t = Tournament::create(&field(68));
        let opener = t.regions[0].rounds[0][0].id;
        t.regions[0].rounds[0][0].away = BracketSlot::Pending(MatchupId(999));
        let mut outcome = Recorder::default();

        t.advance_stage(&mut outcome);
        assert_eq!(
            t.regions[0].rounds[0][0].away,
            BracketSlot::Pending(MatchupId(999))
        );
        outcome.calls.clear();

        let report = t.advance_stage(&mut outcome);
        assert_eq!(report.stage, Some(TournamentStage::RoundOf64));
        let result = report.results.iter().find(|r| r.id == opener).unwrap();
        assert!(result.forfeit);
        assert_eq!(result.score, None);
        assert_eq!(result.winner, Some(TeamId::from("T00")));
        assert_eq!(result.loser, None);
        let top = TeamId::from("T00");
        assert!(outcome.calls.iter().all(|(h, a)| h != &top && a != &top));
        assert_eq!(outcome.calls.len(), 31);

        for _ in 0..5 {
            assert!(!t.advance_stage(&mut outcome).is_noop());
        }
        assert!(t.is_complete());
        assert_eq!(t.champion, Some(top));
    }

    #[test]
    fn empty_field_completes_without_champion() {
        let mut t = Tournament::create(&[]);
        let mut outcome = |_: &TeamId, _: &TeamId, _: u64| -> GameScore {
            panic!("no real games in an empty field")
        };
        for _ in 0..7 {
            let report = t.advance_stage(&mut outcome);
            assert!(report.results.iter().all(|r| r.forfeit && r.winner.is_none()));
        }
        assert!(t.is_complete());
        assert_eq!(t.champion, None);
        assert!(t.advance_stage(&mut outcome).is_noop());
    }

    #[test]
    fn ties_go_to_better_seed_then_home() {
        let mut m = TournamentMatchup {
            id: MatchupId(9),
            stage: TournamentStage::RoundOf32,
            region: Some("East".into()),
            home: BracketSlot::Resolved(TeamId::from("Nine")),
            away: BracketSlot::Resolved(TeamId::from("Eight")),
            home_seed: Some(9),
            away_seed: Some(8),
            score: None,
            winner: None,
            played: false,
        };
        let mut tie = |_: &TeamId, _: &TeamId, _: u64| GameScore { home: 65, away: 65 };
        let mut even = m.clone();
        let result = play(&mut m, &mut tie);
        assert_eq!(result.winner, Some(TeamId::from("Eight")));
        assert_eq!(m.winner_seed(), Some(8));

        even.away_seed = Some(9);
        let result = play(&mut even, &mut tie);
        assert_eq!(result.winner, Some(TeamId::from("Nine")));
        assert!(even.played);
    }

    #[test]
    fn serde_roundtrip_mid_tournament() {
        let mut t = Tournament::create(&field(68));
        let mut outcome = |h: &TeamId, _: &TeamId, seed: u64| GameScore {
            home: 60 + (seed % 20) as u32,
            away: 60 + (h.0.len() as u32 * 3) % 20,
        };
        for _ in 0..3 {
            t.advance_stage(&mut outcome);
        }
        let json = serde_json::to_string(&t).unwrap();
        let mut from_json: Tournament = serde_json::from_str(&json).unwrap();
        let bytes = bincode::serialize(&t).unwrap();
        let mut from_bin: Tournament = bincode::deserialize(&bytes).unwrap();
        assert_eq!(from_json, t);
        assert_eq!(from_bin, t);

        while !t.is_complete() {
            let a = t.advance_stage(&mut outcome);
            let b = from_json.advance_stage(&mut outcome);
            let c = from_bin.advance_stage(&mut outcome);
            assert_eq!(a, b);
            assert_eq!(a, c);
        }
        assert_eq!(from_json.champion, t.champion);
    }

    proptest! {
        #[test]
        fn any_field_size_finishes_in_seven_stages(n in 0usize..90, spread in 1u32..30) {
            let mut t = Tournament::create(&field(n));
            let mut outcome = |_: &TeamId, _: &TeamId, seed: u64| GameScore {
                home: 50 + (seed % u64::from(spread)) as u32,
                away: 50 + (seed / 7 % u64::from(spread)) as u32,
            };
            for _ in 0..7 {
                prop_assert!(!t.advance_stage(&mut outcome).is_noop());
            }
            prop_assert!(t.is_complete());
            prop_assert_eq!(t.champion.is_some(), n > 0);
            for m in t.matchups() {
                prop_assert!(m.played);
                if let Some(w) = &m.winner {
                    prop_assert!(m.home.team() == Some(w) || m.away.team() == Some(w));
                }
            }
            prop_assert!(t.advance_stage(&mut outcome).is_noop());
        }
    }
}
