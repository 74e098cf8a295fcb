//! Testing helpers: float assertions and synthetic game-log fixtures.

use assert_float_eq::*;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::domain::{GameLog, GameLogEntry, GameResult, Player, Sport, StatKind};

pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_relative_eq!(expected, actual, epsilon);
        }
    }
}

pub fn player(name: &str) -> Player {
    Player {
        name: name.into(),
        sport: Sport::Nba,
        team: "Boston Celtics".into(),
        position: "SG".into(),
    }
}

/// A single game with sensible defaults: home win on one day's rest against a
/// mid-tier defense, recording `points` for [`StatKind::Points`].
pub fn entry(date: &str, points: f64) -> GameLogEntry {
    let mut stats = FxHashMap::default();
    stats.insert(StatKind::Points, points);
    GameLogEntry {
        date: date.parse().unwrap(),
        opponent: "New York Knicks".into(),
        home: true,
        rest_days: 1,
        back_to_back: false,
        stats,
        result: GameResult::Win,
        opponent_def_rank: Some(15),
    }
}

/// A log of `points` values, most recent first, on a two-day cadence ending
/// 2024-04-01.
pub fn log(points: &[f64]) -> GameLog {
    let latest = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let entries = points
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            let date = latest - chrono::Duration::days(2 * index as i64);
            entry(&date.to_string(), value)
        })
        .collect();
    GameLog::new(entries).unwrap()
}
