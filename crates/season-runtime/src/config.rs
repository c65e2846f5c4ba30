//! League configuration loaded from YAML.

use season_core::{CalendarDate, ConferenceId, ScheduleSettings, Team};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid league: {0}")]
    Invalid(String),
    #[error("invalid blackout date {0:?}, expected MM-DD")]
    BadBlackout(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamConfig {
    pub name: String,
    #[serde(default)]
    pub prestige: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceConfig {
    pub name: String,
    /// In-conference games per team.
    pub quota: u32,
    pub teams: Vec<TeamConfig>,
}

/// A league and its scheduling knobs.
///
/// ```yaml
/// season_year: 2025
/// rng_seed: 42
/// games_per_team: 30
/// blackout: ["12-24", "12-25"]
/// conferences:
///   - name: Atlantic
///     quota: 10
///     teams:
///       - { name: Northfield, prestige: 80 }
/// independents:
///   - { name: Lakeshore, prestige: 40 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueConfig {
    pub season_year: i32,
    #[serde(default)]
    pub rng_seed: u64,
    pub games_per_team: u32,
    #[serde(default = "default_max_meetings")]
    pub max_meetings_per_pair: u32,
    /// Month-day pairs (`MM-DD`) blacked out every season. Months from July
    /// on fall in the season-year, earlier months in the following year.
    #[serde(default)]
    pub blackout: Vec<String>,
    #[serde(default)]
    pub conferences: Vec<ConferenceConfig>,
    #[serde(default)]
    pub independents: Vec<TeamConfig>,
}

fn default_max_meetings() -> u32 {
    2
}

const SYNTHETIC_CONFERENCES: [&str; 8] = [
    "Atlantic", "Pacific", "Central", "Mountain", "Coastal", "Northern", "Southern", "Prairie",
];

impl LeagueConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&text)?;
        info!(
            path = %path.as_ref().display(),
            teams = config.team_count(),
            "league config loaded"
        );
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: LeagueConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Evenly sized conferences with generated names; up to eight
    /// conferences. `size` should be even. Each team plays everyone but two
    /// teams of its conference, plus up to 20 non-conference games.
    pub fn synthetic(conferences: usize, size: usize, season_year: i32, rng_seed: u64) -> Self {
        let conferences = conferences.min(SYNTHETIC_CONFERENCES.len());
        let non_conference = (conferences.saturating_sub(1) * size / 2).min(20) as u32;
        let conferences: Vec<ConferenceConfig> = SYNTHETIC_CONFERENCES
            .iter()
            .take(conferences)
            .enumerate()
            .map(|(c, name)| ConferenceConfig {
                name: name.to_string(),
                quota: size.saturating_sub(2) as u32,
                teams: (0..size)
                    .map(|i| TeamConfig {
                        name: format!("{name} {:02}", i + 1),
                        prestige: ((i * 37 + c * 11) % 100) as u32,
                    })
                    .collect(),
            })
            .collect();
        Self {
            season_year,
            rng_seed,
            games_per_team: (size as u32).saturating_sub(2) + non_conference,
            max_meetings_per_pair: default_max_meetings(),
            blackout: vec!["12-24".into(), "12-25".into()],
            conferences,
            independents: Vec::new(),
        }
    }

    pub fn team_count(&self) -> usize {
        self.conferences.iter().map(|c| c.teams.len()).sum::<usize>() + self.independents.len()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.games_per_team == 0 {
            return Err(ConfigError::Invalid("games_per_team must be positive".into()));
        }
        let mut conferences = HashSet::new();
        for c in &self.conferences {
            if c.name.trim().is_empty() {
                return Err(ConfigError::Invalid("conference with empty name".into()));
            }
            if !conferences.insert(c.name.as_str()) {
                return Err(ConfigError::Invalid(format!("conference {} listed twice", c.name)));
            }
            if c.teams.is_empty() {
                return Err(ConfigError::Invalid(format!("conference {} has no teams", c.name)));
            }
        }
        let mut names = HashSet::new();
        let all = self
            .conferences
            .iter()
            .flat_map(|c| c.teams.iter())
            .chain(self.independents.iter());
        for team in all {
            if team.name.trim().is_empty() {
                return Err(ConfigError::Invalid("team with empty name".into()));
            }
            if !names.insert(team.name.as_str()) {
                return Err(ConfigError::Invalid(format!("team {} listed twice", team.name)));
            }
        }
        for raw in &self.blackout {
            parse_month_day(raw)?;
        }
        Ok(())
    }

    pub fn teams(&self) -> Vec<Team> {
        let mut teams: Vec<Team> = self
            .conferences
            .iter()
            .flat_map(|c| {
                c.teams
                    .iter()
                    .map(move |t| Team::new(t.name.as_str(), Some(c.name.as_str()), t.prestige))
            })
            .collect();
        teams.extend(
            self.independents
                .iter()
                .map(|t| Team::new(t.name.as_str(), None, t.prestige)),
        );
        teams
    }

    /// Generator settings for `season_year`, with blackouts resolved to dates.
    pub fn settings_for(&self, season_year: i32) -> Result<ScheduleSettings, ConfigError> {
        let mut blackout_dates = Vec::with_capacity(self.blackout.len());
        for raw in &self.blackout {
            let (month, day) = parse_month_day(raw)?;
            let year = if month >= 7 { season_year } else { season_year + 1 };
            let date = CalendarDate::from_ymd(year, month, day)
                .map_err(|_| ConfigError::BadBlackout(raw.clone()))?;
            blackout_dates.push(date);
        }
        let conference_quotas: BTreeMap<ConferenceId, u32> = self
            .conferences
            .iter()
            .map(|c| (ConferenceId::from(c.name.as_str()), c.quota))
            .collect();
        Ok(ScheduleSettings {
            games_per_team: self.games_per_team,
            conference_quotas,
            max_meetings_per_pair: self.max_meetings_per_pair,
            blackout_dates,
            rng_seed: self.rng_seed,
            ..ScheduleSettings::default()
        })
    }
}

fn parse_month_day(raw: &str) -> Result<(u32, u32), ConfigError> {
    let bad = || ConfigError::BadBlackout(raw.to_string());
    let (m, d) = raw.trim().split_once('-').ok_or_else(bad)?;
    let month: u32 = m.parse().map_err(|_| bad())?;
    let day: u32 = d.parse().map_err(|_| bad())?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(bad());
    }
    Ok((month, day))
}
