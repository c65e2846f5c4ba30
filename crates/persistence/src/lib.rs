#![deny(warnings)]

//! Persistence layer: versioned season snapshots as JSON or bincode.
//!
//! Version 1 saves predate the schedule indices and store the schedule as a
//! flat game list; loading one rebuilds the indices.

use anyhow::{bail, Context, Result};
use season_core::{
    AnnualCalendar, CalendarDate, ScheduleSettings, ScheduledGame, SeasonSchedule, Team,
};
use season_bracket::Tournament;
use season_runtime::{SeasonPhase, SeasonState};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// Version written by [`save`].
pub const SAVE_VERSION: u32 = 2;

/// Returns the default location used for local saves.
pub fn default_save_path() -> &'static str {
    "./saves/season.json"
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Json,
    Bincode,
}

impl SaveFormat {
    /// `.bin` / `.bincode` files are bincode, everything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") | Some("bincode") => SaveFormat::Bincode,
            _ => SaveFormat::Json,
        }
    }
}

impl FromStr for SaveFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(SaveFormat::Json),
            "bincode" | "bin" => Ok(SaveFormat::Bincode),
            other => bail!("unknown save format {other:?} (expected json or bincode)"),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub state: SeasonState,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Deserialize)]
struct LegacySave {
    #[serde(rename = "version")]
    _version: u32,
    state: LegacyState,
}

#[derive(Deserialize)]
struct LegacyState {
    calendar: AnnualCalendar,
    teams: Vec<Team>,
    settings: ScheduleSettings,
    schedule: LegacySchedule,
    tournament: Option<Tournament>,
    current_date: CalendarDate,
    phase: SeasonPhase,
}

#[derive(Deserialize)]
struct LegacySchedule {
    season_year: i32,
    season_start: CalendarDate,
    regular_season_end: CalendarDate,
    games: Vec<ScheduledGame>,
}

impl LegacyState {
    fn migrate(self) -> SeasonState {
        let s = self.schedule;
        let games = s.games.len();
        let schedule = SeasonSchedule::from_games(
            s.season_year,
            s.season_start,
            s.regular_season_end,
            s.games,
        );
        info!(games, "rebuilt schedule indices from a version 1 save");
        SeasonState {
            calendar: self.calendar,
            teams: self.teams,
            settings: self.settings,
            schedule,
            tournament: self.tournament,
            current_date: self.current_date,
            phase: self.phase,
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8], format: SaveFormat) -> Result<T> {
    Ok(match format {
        SaveFormat::Json => serde_json::from_slice(bytes)?,
        SaveFormat::Bincode => bincode::deserialize(bytes)?,
    })
}

pub fn to_bytes(state: &SeasonState, format: SaveFormat) -> Result<Vec<u8>> {
    let file = SaveFile {
        version: SAVE_VERSION,
        state: state.clone(),
    };
    Ok(match format {
        SaveFormat::Json => serde_json::to_vec_pretty(&file)?,
        SaveFormat::Bincode => bincode::serialize(&file)?,
    })
}

/// Decode a save of any supported version.
pub fn from_bytes(bytes: &[u8], format: SaveFormat) -> Result<SeasonState> {
    let probe: VersionProbe = decode(bytes, format).context("reading save version")?;
    match probe.version {
        1 => {
            let legacy: LegacySave = decode(bytes, format).context("decoding version 1 save")?;
            Ok(legacy.state.migrate())
        }
        SAVE_VERSION => {
            let file: SaveFile = decode(bytes, format).context("decoding save")?;
            Ok(file.state)
        }
        v => bail!("unsupported save version {v} (newest known is {SAVE_VERSION})"),
    }
}

/// Write `state` to `path`, creating parent directories.
pub fn save<P: AsRef<Path>>(path: P, state: &SeasonState, format: SaveFormat) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let bytes = to_bytes(state, format)?;
    fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), ?format, "season saved");
    Ok(())
}

pub fn load<P: AsRef<Path>>(path: P, format: SaveFormat) -> Result<SeasonState> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let state = from_bytes(&bytes, format)?;
    let issues = season_schedule::validate(&state.schedule, &state.teams, &state.settings);
    if !issues.is_empty() {
        warn!(
            path = %path.display(),
            issues = issues.len(),
            "loaded schedule has validation issues"
        );
    }
    Ok(state)
}
