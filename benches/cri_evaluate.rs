use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};
use rustc_hash::FxHashMap;

use sharpline::convergence::{self, Direction};
use sharpline::domain::{
    GameContext, GameLog, GameLogEntry, GameResult, Player, SeasonStats, Sport, StatKind,
};

fn fixture_log(games: usize) -> GameLog {
    let latest = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let entries = (0..games)
        .map(|index| {
            let mut stats = FxHashMap::default();
            stats.insert(StatKind::Points, 20.0 + (index % 9) as f64);
            GameLogEntry {
                date: latest - chrono::Duration::days(2 * index as i64),
                opponent: if index % 4 == 0 {
                    "Miami Heat".into()
                } else {
                    "New York Knicks".into()
                },
                home: index % 2 == 0,
                rest_days: (index % 3) as u32,
                back_to_back: index % 5 == 0,
                stats,
                result: if index % 3 == 0 {
                    GameResult::Loss
                } else {
                    GameResult::Win
                },
                opponent_def_rank: Some((index % 30) as u32 + 1),
            }
        })
        .collect();
    GameLog::new(entries).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let player = Player {
        name: "Jayson Tatum".into(),
        sport: Sport::Nba,
        team: "Boston Celtics".into(),
        position: "SG".into(),
    };
    let ctx = GameContext {
        opponent: "Miami Heat".into(),
        home: true,
        rest_days: 2,
        back_to_back: false,
    };
    let log = fixture_log(82);
    let season = SeasonStats::from_log(&log, StatKind::Points).unwrap();

    // sanity check
    let result = convergence::evaluate(
        &player,
        &ctx,
        &log,
        Some(&season),
        None,
        &[],
        StatKind::Points,
        22.5,
    );
    assert_ne!(Direction::TossUp, result.direction);

    c.bench_function("cri_evaluate_full_season", |b| {
        b.iter(|| {
            convergence::evaluate(
                &player,
                &ctx,
                &log,
                Some(&season),
                None,
                &[],
                StatKind::Points,
                22.5,
            )
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
