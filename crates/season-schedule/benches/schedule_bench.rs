use criterion::{black_box, criterion_group, criterion_main, Criterion};
use season_core::{build_annual_calendar, ConferenceId, ScheduleSettings, Team};

fn build_league(conferences: usize, size: usize) -> Vec<Team> {
    let mut teams = Vec::with_capacity(conferences * size);
    for c in 0..conferences {
        let conf = format!("Conf{c}");
        for i in 0..size {
            teams.push(Team::new(format!("T{c}-{i}"), Some(&conf), (i * 13 % 100) as u32));
        }
    }
    teams
}

fn bench_generate(c: &mut Criterion) {
    let calendar = build_annual_calendar(2025);
    let teams = build_league(2, 20);
    let mut settings = ScheduleSettings {
        rng_seed: 42,
        ..ScheduleSettings::default()
    };
    for conf in ["Conf0", "Conf1"] {
        settings.conference_quotas.insert(ConferenceId::from(conf), 6);
    }
    c.bench_function("generate 40 teams x 31 games", |b| {
        b.iter(|| {
            let _ = black_box(season_schedule::generate(2025, &teams, &settings, &calendar));
        })
    });

    let big = build_league(8, 12);
    let mut big_settings = ScheduleSettings {
        games_per_team: 30,
        rng_seed: 7,
        ..ScheduleSettings::default()
    };
    for i in 0..8 {
        big_settings
            .conference_quotas
            .insert(ConferenceId::from(format!("Conf{i}")), 10);
    }
    c.bench_function("generate 96 teams x 30 games", |b| {
        b.iter(|| {
            let _ = black_box(season_schedule::generate(2025, &big, &big_settings, &calendar));
        })
    });
}

fn bench_validate(c: &mut Criterion) {
    let calendar = build_annual_calendar(2025);
    let teams = build_league(2, 20);
    let settings = ScheduleSettings {
        rng_seed: 1,
        ..ScheduleSettings::default()
    };
    let schedule = season_schedule::generate(2025, &teams, &settings, &calendar)
        .expect("40-team league schedules");
    c.bench_function("validate 40 teams", |b| {
        b.iter(|| black_box(season_schedule::validate(&schedule, &teams, &settings)))
    });
}

criterion_group!(benches, bench_generate, bench_validate);
criterion_main!(benches);
