#![deny(warnings)]

//! Headless runner: build or resume a season and drive it day by day.

use anyhow::{bail, Context, Result};
use persistence::SaveFormat;
use season_core::TeamId;
use season_runtime::{
    advance_days, advance_until_team_plays, run_to_completion, season_from_config, DayReport,
    LeagueConfig, RatingOutcome, SeasonEvent, SeasonState,
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Upper bound for `--auto`; a season spans well under a year of days.
const MAX_SEASON_DAYS: u32 = 400;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    load: Option<PathBuf>,
    year: Option<i32>,
    seed: Option<u64>,
    days: Option<u32>,
    until_team: Option<String>,
    auto: bool,
    save: Option<PathBuf>,
    format: Option<SaveFormat>,
    version: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().with_context(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--config" => args.config = Some(value()?.into()),
            "--load" => args.load = Some(value()?.into()),
            "--year" => args.year = Some(value()?.parse().context("--year")?),
            "--seed" => args.seed = Some(value()?.parse().context("--seed")?),
            "--days" => args.days = Some(value()?.parse().context("--days")?),
            "--until-team" => args.until_team = Some(value()?),
            "--auto" => args.auto = true,
            "--save" => args.save = Some(value()?.into()),
            "--format" => args.format = Some(value()?.parse()?),
            "--version" => args.version = true,
            other => bail!("unknown argument {other}"),
        }
    }
    Ok(args)
}

fn initial_state(args: &Args) -> Result<SeasonState> {
    if let Some(path) = &args.load {
        let state = persistence::load(path, SaveFormat::from_path(path))?;
        info!(path = %path.display(), date = %state.current_date, "resumed save");
        return Ok(state);
    }
    let mut config = match &args.config {
        Some(path) => LeagueConfig::load(path)
            .with_context(|| format!("loading league from {}", path.display()))?,
        None => LeagueConfig::synthetic(8, 12, 2025, 42),
    };
    if let Some(year) = args.year {
        config.season_year = year;
    }
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    Ok(season_from_config(&config)?)
}

fn print_day(report: &DayReport) {
    for event in &report.events {
        match event {
            SeasonEvent::GamePlayed { .. } => {}
            SeasonEvent::TournamentCreated { entrants } => {
                println!("{} | tournament field set: {} teams", report.date, entrants)
            }
            SeasonEvent::StagePlayed { stage, results } => {
                println!("{} | {}: {} matchups", report.date, stage.label(), results.len())
            }
            SeasonEvent::ChampionCrowned { team } => {
                println!("{} | champion: {}", report.date, team)
            }
            SeasonEvent::PhaseChanged { from, to } => {
                println!("{} | phase {:?} -> {:?}", report.date, from, to)
            }
        }
    }
}

fn print_summary(state: &SeasonState) {
    println!(
        "Season {} | date: {} | phase: {:?} | games played: {}/{}",
        state.season_year(),
        state.current_date,
        state.phase,
        state.schedule.played_count(),
        state.schedule.len()
    );
    let standings = state.standings();
    for (rank, (team, record)) in standings.ranked().into_iter().take(10).enumerate() {
        println!(
            "{:>3}. {:<20} {:>2}-{:<2} ({:+})",
            rank + 1,
            team.to_string(),
            record.wins,
            record.losses,
            record.point_differential()
        );
    }
    if let Some(tournament) = &state.tournament {
        for (stage, lines) in tournament.render_state() {
            println!("-- {} --", stage.label());
            for line in lines {
                println!("  {line}");
            }
        }
    }
    match state.champion() {
        Some(team) => println!("Champion: {team}"),
        None => println!("Champion: (undecided)"),
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args()?;
    if args.version {
        println!(
            "season-cli {} ({} built {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(
        config = ?args.config,
        year = ?args.year,
        days = ?args.days,
        auto = args.auto,
        "starting CLI"
    );

    let mut state = initial_state(&args)?;
    let mut outcome = RatingOutcome::new(&state.teams, args.seed.unwrap_or(42));

    if let Some(name) = &args.until_team {
        let team = TeamId::from(name.as_str());
        if !state.teams.iter().any(|t| t.id == team) {
            bail!("unknown team {name}");
        }
        let limit = args.days.unwrap_or(MAX_SEASON_DAYS);
        let (next, reports) = advance_until_team_plays(state, &team, limit, &mut outcome);
        state = next;
        reports.iter().for_each(print_day);
        if let Some(game) = state
            .schedule
            .team_schedule(&team)
            .filter(|g| g.played)
            .last()
        {
            let score = game
                .score
                .map(|s| format!("{}-{}", s.home, s.away))
                .unwrap_or_default();
            println!(
                "Last game for {}: {} {} at {} {}",
                team, game.date, game.away, game.home, score
            );
        }
    } else if args.auto {
        let (next, summary) = run_to_completion(state, MAX_SEASON_DAYS, &mut outcome);
        state = next;
        println!(
            "Ran {} days | games: {} | stages: {}",
            summary.days, summary.games_played, summary.stages_played
        );
    } else if let Some(days) = args.days {
        let (next, reports) = advance_days(state, days, &mut outcome);
        state = next;
        reports.iter().for_each(print_day);
    }

    print_summary(&state);

    if let Some(path) = &args.save {
        let format = args.format.unwrap_or_else(|| SaveFormat::from_path(path));
        persistence::save(path, &state, format)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
