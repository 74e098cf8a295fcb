//! Reference data model shared by the scoring core: players, stat kinds, game
//! logs, season aggregates, defensive rankings and injury context. All records
//! are plain data; the only behaviour lives in derivations ([`SeasonStats::from_log`])
//! and in the ordering invariant enforced by [`GameLog`].

use anyhow::bail;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;
use thiserror::Error;

/// Rest days at or above which a player counts as rested.
pub const RESTED_REST_DAYS: u32 = 3;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Nba,
    Nfl,
    Mlb,
    Nhl,
}
impl Display for Sport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Sport::Nba => "NBA",
            Sport::Nfl => "NFL",
            Sport::Mlb => "MLB",
            Sport::Nhl => "NHL",
        };
        write!(f, "{str}")
    }
}

/// Closed set of proppable stat categories. Replaces the stringly-typed stat
/// keys of ad hoc feeds so consumers match exhaustively.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatKind {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    ThreePointers,
    Goals,
    Shots,
    Saves,
    PassingYards,
    RushingYards,
    ReceivingYards,
    Receptions,
    Strikeouts,
    TotalBases,
}
impl StatKind {
    /// Stats that scale with ball (or puck) usage; a key teammate sitting out
    /// funnels opportunity into these.
    pub fn is_usage_driven(&self) -> bool {
        matches!(self, StatKind::Points | StatKind::Assists | StatKind::Goals)
    }
}
impl FromStr for StatKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "points" | "pts" => Ok(StatKind::Points),
            "rebounds" | "reb" => Ok(StatKind::Rebounds),
            "assists" | "ast" => Ok(StatKind::Assists),
            "steals" | "stl" => Ok(StatKind::Steals),
            "blocks" | "blk" => Ok(StatKind::Blocks),
            "three_pointers" | "threes" | "3pm" => Ok(StatKind::ThreePointers),
            "goals" => Ok(StatKind::Goals),
            "shots" | "sog" => Ok(StatKind::Shots),
            "saves" => Ok(StatKind::Saves),
            "passing_yards" => Ok(StatKind::PassingYards),
            "rushing_yards" => Ok(StatKind::RushingYards),
            "receiving_yards" => Ok(StatKind::ReceivingYards),
            "receptions" | "rec" => Ok(StatKind::Receptions),
            "strikeouts" | "ks" => Ok(StatKind::Strikeouts),
            "total_bases" | "tb" => Ok(StatKind::TotalBases),
            other => bail!("unsupported stat {other}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub sport: Sport,
    pub team: String,
    pub position: String,
}

/// Context of the upcoming game an evaluation is scored against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameContext {
    pub opponent: String,
    pub home: bool,
    pub rest_days: u32,
    pub back_to_back: bool,
}
impl GameContext {
    pub fn rest_tier(&self) -> RestTier {
        if self.back_to_back {
            RestTier::BackToBack
        } else if self.rest_days >= RESTED_REST_DAYS {
            RestTier::Rested
        } else {
            RestTier::Normal
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
}

/// One historical game. `stats` holds whichever categories the feed captured;
/// a missing key means the stat was not recorded, not that it was zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameLogEntry {
    pub date: NaiveDate,
    pub opponent: String,
    pub home: bool,
    pub rest_days: u32,
    pub back_to_back: bool,
    pub stats: FxHashMap<StatKind, f64>,
    pub result: GameResult,
    pub opponent_def_rank: Option<u32>,
}
impl GameLogEntry {
    pub fn value(&self, stat: StatKind) -> Option<f64> {
        self.stats.get(&stat).copied()
    }

    pub fn defense_tier(&self) -> Option<DefenseTier> {
        self.opponent_def_rank.map(DefenseTier::from_rank)
    }

    pub fn rest_tier(&self) -> RestTier {
        if self.back_to_back {
            RestTier::BackToBack
        } else if self.rest_days >= RESTED_REST_DAYS {
            RestTier::Rested
        } else {
            RestTier::Normal
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("game log must be ordered most recent first: {newer} appears after {older} at index {index}")]
pub struct UnorderedGameLog {
    pub index: usize,
    pub older: NaiveDate,
    pub newer: NaiveDate,
}

/// A player's game log, most recent game first. The ordering is an enforced
/// invariant of the type, not a convention: several heuristics read "the last
/// game" straight off index 0.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GameLogEntry>")]
pub struct GameLog(Vec<GameLogEntry>);
impl GameLog {
    pub fn new(entries: Vec<GameLogEntry>) -> Result<Self, UnorderedGameLog> {
        for (index, window) in entries.windows(2).enumerate() {
            if window[1].date > window[0].date {
                return Err(UnorderedGameLog {
                    index: index + 1,
                    older: window[0].date,
                    newer: window[1].date,
                });
            }
        }
        Ok(Self(entries))
    }

    /// Accepts a log in any order and sorts it most recent first.
    pub fn from_unordered(mut entries: Vec<GameLogEntry>) -> Self {
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Self(entries)
    }

    pub fn empty() -> Self {
        Self(vec![])
    }

    pub fn most_recent(&self) -> Option<&GameLogEntry> {
        self.0.first()
    }

    /// Recorded values of `stat`, most recent first, skipping games where the
    /// feed did not capture it.
    pub fn values(&self, stat: StatKind) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().filter_map(move |entry| entry.value(stat))
    }
}
impl Deref for GameLog {
    type Target = [GameLogEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl TryFrom<Vec<GameLogEntry>> for GameLog {
    type Error = UnorderedGameLog;

    fn try_from(entries: Vec<GameLogEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

/// Per (player, stat) aggregate, recomputed per request and never persisted.
/// `career_total` is fed separately by the provider when it tracks one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonStats {
    pub average: f64,
    pub total: f64,
    pub games_played: usize,
    pub high: f64,
    pub low: f64,
    #[serde(default)]
    pub career_total: Option<f64>,
}
impl SeasonStats {
    /// Derives the aggregate from a game log, or `None` when the log carries
    /// no recorded values for `stat`.
    pub fn from_log(log: &GameLog, stat: StatKind) -> Option<SeasonStats> {
        let values: Vec<f64> = log.values(stat).collect();
        if values.is_empty() {
            return None;
        }
        let total: f64 = values.iter().sum();
        let high = values.iter().fold(f64::MIN, |acc, &v| acc.max(v));
        let low = values.iter().fold(f64::MAX, |acc, &v| acc.min(v));
        Some(SeasonStats {
            average: total / values.len() as f64,
            total,
            games_played: values.len(),
            high,
            low,
            career_total: None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DefenseTier {
    Top,
    Mid,
    Bottom,
}
impl DefenseTier {
    pub fn from_rank(rank: u32) -> Self {
        match rank {
            0..=10 => DefenseTier::Top,
            11..=20 => DefenseTier::Mid,
            _ => DefenseTier::Bottom,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestTier {
    BackToBack,
    Normal,
    Rested,
}
impl Display for RestTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            RestTier::BackToBack => "a back-to-back",
            RestTier::Normal => "normal rest",
            RestTier::Rested => "extended rest",
        };
        write!(f, "{str}")
    }
}

/// Defensive ranking of a team against a position for one stat category.
/// Rank 1 is the stingiest defense in the league.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefenseRanking {
    pub team: String,
    pub position: String,
    pub stat: StatKind,
    pub rank: u32,
    pub average_allowed: f64,
}
impl DefenseRanking {
    pub fn tier(&self) -> DefenseTier {
        DefenseTier::from_rank(self.rank)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InjuryStatus {
    Out,
    Questionable,
    #[serde(rename = "day-to-day")]
    DayToDay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjuryImpact {
    High,
    Medium,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjurySide {
    Teammate,
    Opponent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InjuryContext {
    pub player_name: String,
    pub status: InjuryStatus,
    pub impact: InjuryImpact,
    pub team: InjurySide,
    pub relevance: String,
}
