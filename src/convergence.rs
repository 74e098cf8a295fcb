//! The convergence aggregator: reduces every informational input to exactly
//! one [`ConvergenceFactor`] and counts the over/under camps. A factor with no
//! meaningful data stays neutral at strength zero but remains in the
//! denominator, so an uninformative night reports a correspondingly low
//! confidence rather than a false positive.

use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

use crate::domain::{DefenseRanking, DefenseTier, GameContext, GameLog, InjuryContext, Player, SeasonStats, StatKind};
use crate::narrative::{self, Impact, NarrativeFlag, Severity};
use crate::situations::{self, SimilarSituationsResult};

/// Relative edge over the line at which a value-vs-line factor saturates to
/// full strength. A tunable, not a derived constant.
pub const EDGE_SATURATION_PCT: f64 = 0.25;
/// Recent-form window and its minimum sample.
pub const RECENT_GAMES: usize = 5;
pub const RECENT_MIN_GAMES: usize = 3;
/// Net narrative weight at which the narrative factor saturates.
pub const NARRATIVE_SATURATION: f64 = 4.0;
/// Hit-rate bands for the similar-situations factor.
pub const HIT_RATE_OVER: f64 = 0.6;
pub const HIT_RATE_UNDER: f64 = 0.4;
/// Coefficient of variation below which a player counts as consistent.
pub const CONSISTENT_CV: f64 = 0.25;
/// Minimum samples for the volatility and venue-split factors.
pub const VOLATILITY_MIN_GAMES: usize = 5;
pub const SPLIT_MIN_GAMES: usize = 3;

/// The seven factors, evaluated in declaration order.
#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, Ordinal, EnumCountMacro, EnumIter, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FactorKey {
    RecentForm,
    SeasonVsLine,
    DefenseMatchup,
    Narratives,
    SimilarSituations,
    Volatility,
    HomeAwaySplit,
}
impl FactorKey {
    pub fn name(&self) -> &'static str {
        match self {
            FactorKey::RecentForm => "Recent form",
            FactorKey::SeasonVsLine => "Season average vs line",
            FactorKey::DefenseMatchup => "Defensive matchup",
            FactorKey::Narratives => "Narrative signals",
            FactorKey::SimilarSituations => "Similar situations",
            FactorKey::Volatility => "Consistency",
            FactorKey::HomeAwaySplit => "Home/away split",
        }
    }
}

pub const NUM_FACTORS: usize = FactorKey::COUNT;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Signal {
    Over,
    Under,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Direction {
    #[serde(rename = "over")]
    #[strum(serialize = "over")]
    Over,
    #[serde(rename = "under")]
    #[strum(serialize = "under")]
    Under,
    #[serde(rename = "toss-up")]
    #[strum(serialize = "toss-up")]
    TossUp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceFactor {
    pub key: FactorKey,
    pub name: String,
    pub signal: Signal,
    pub strength: f64,
}
impl ConvergenceFactor {
    fn new(key: FactorKey, signal: Signal, strength: f64) -> Self {
        Self {
            key,
            name: key.name().into(),
            signal,
            strength,
        }
    }

    fn neutral(key: FactorKey) -> Self {
        Self::new(key, Signal::Neutral, 0.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceResult {
    pub score: usize,
    pub direction: Direction,
    pub confidence: f64,
    pub factors: Vec<ConvergenceFactor>,
}

/// Scores one (player, stat, line, game) tuple. Total by construction: missing
/// upstream data degrades individual factors to neutral, never aborts.
pub fn evaluate(
    player: &Player,
    ctx: &GameContext,
    log: &GameLog,
    season: Option<&SeasonStats>,
    defense: Option<&DefenseRanking>,
    injuries: &[InjuryContext],
    stat: StatKind,
    line: f64,
) -> ConvergenceResult {
    let flags = narrative::detect_narratives(player, ctx, log, season, injuries, stat, line);
    let situations = situations::find_similar_situations(player, ctx, log, defense, stat, line);

    let factors: Vec<_> = FactorKey::iter()
        .map(|key| match key {
            FactorKey::RecentForm => recent_form(log, stat, line),
            FactorKey::SeasonVsLine => season_vs_line(season, line),
            FactorKey::DefenseMatchup => defense_matchup(defense),
            FactorKey::Narratives => narrative_lean(&flags),
            FactorKey::SimilarSituations => situational_lean(situations.as_ref()),
            FactorKey::Volatility => volatility(log, stat, line),
            FactorKey::HomeAwaySplit => venue_split(ctx, log, stat, line),
        })
        .collect();

    let overs = factors.iter().filter(|f| f.signal == Signal::Over).count();
    let unders = factors.iter().filter(|f| f.signal == Signal::Under).count();
    let (direction, score) = decide(overs, unders);
    ConvergenceResult {
        score,
        direction,
        confidence: score as f64 / NUM_FACTORS as f64,
        factors,
    }
}

/// Majority rule; over/under ties resolve to over. The tie-break is an
/// explicit product decision with no statistical motivation.
fn decide(overs: usize, unders: usize) -> (Direction, usize) {
    if overs == 0 && unders == 0 {
        (Direction::TossUp, 0)
    } else if overs >= unders {
        (Direction::Over, overs)
    } else {
        (Direction::Under, unders)
    }
}

/// Maps a value-vs-line comparison to a signal and a linearly ramped strength.
fn edge(key: FactorKey, value: f64, line: f64) -> ConvergenceFactor {
    let diff = value - line;
    if diff == 0.0 {
        return ConvergenceFactor::neutral(key);
    }
    let signal = if diff > 0.0 { Signal::Over } else { Signal::Under };
    let strength = if line.abs() > 0.0 {
        (diff.abs() / (EDGE_SATURATION_PCT * line.abs())).min(1.0)
    } else {
        1.0
    };
    ConvergenceFactor::new(key, signal, strength)
}

fn recent_form(log: &GameLog, stat: StatKind, line: f64) -> ConvergenceFactor {
    let recent: Vec<f64> = log.values(stat).take(RECENT_GAMES).collect();
    if recent.len() < RECENT_MIN_GAMES {
        return ConvergenceFactor::neutral(FactorKey::RecentForm);
    }
    let average = recent.iter().sum::<f64>() / recent.len() as f64;
    edge(FactorKey::RecentForm, average, line)
}

fn season_vs_line(season: Option<&SeasonStats>, line: f64) -> ConvergenceFactor {
    match season {
        Some(season) if season.games_played > 0 => {
            edge(FactorKey::SeasonVsLine, season.average, line)
        }
        _ => ConvergenceFactor::neutral(FactorKey::SeasonVsLine),
    }
}

fn defense_matchup(defense: Option<&DefenseRanking>) -> ConvergenceFactor {
    let Some(defense) = defense else {
        return ConvergenceFactor::neutral(FactorKey::DefenseMatchup);
    };
    match defense.tier() {
        DefenseTier::Top => {
            let strength = ((11 - defense.rank.min(10)) as f64 / 10.0).min(1.0);
            ConvergenceFactor::new(FactorKey::DefenseMatchup, Signal::Under, strength)
        }
        DefenseTier::Bottom => {
            let strength = ((defense.rank - 20) as f64 / 10.0).min(1.0);
            ConvergenceFactor::new(FactorKey::DefenseMatchup, Signal::Over, strength)
        }
        DefenseTier::Mid => ConvergenceFactor::neutral(FactorKey::DefenseMatchup),
    }
}

fn narrative_lean(flags: &[NarrativeFlag]) -> ConvergenceFactor {
    let weight = |severity: Severity| match severity {
        Severity::High => 2.0,
        Severity::Medium => 1.0,
        Severity::Low => 0.5,
    };
    let net: f64 = flags
        .iter()
        .map(|flag| match flag.impact {
            Impact::Positive => weight(flag.severity),
            Impact::Negative => -weight(flag.severity),
            Impact::Neutral => 0.0,
        })
        .sum();
    if net == 0.0 {
        return ConvergenceFactor::neutral(FactorKey::Narratives);
    }
    let signal = if net > 0.0 { Signal::Over } else { Signal::Under };
    let strength = (net.abs() / NARRATIVE_SATURATION).min(1.0);
    ConvergenceFactor::new(FactorKey::Narratives, signal, strength)
}

fn situational_lean(situations: Option<&SimilarSituationsResult>) -> ConvergenceFactor {
    let Some(situations) = situations else {
        return ConvergenceFactor::neutral(FactorKey::SimilarSituations);
    };
    let strength = ((situations.hit_rate - 0.5).abs() * 2.0).min(1.0);
    if situations.hit_rate >= HIT_RATE_OVER {
        ConvergenceFactor::new(FactorKey::SimilarSituations, Signal::Over, strength)
    } else if situations.hit_rate <= HIT_RATE_UNDER {
        ConvergenceFactor::new(FactorKey::SimilarSituations, Signal::Under, strength)
    } else {
        ConvergenceFactor::neutral(FactorKey::SimilarSituations)
    }
}

/// A consistent producer reinforces whichever side of the line his mean sits
/// on; a volatile one says nothing.
fn volatility(log: &GameLog, stat: StatKind, line: f64) -> ConvergenceFactor {
    let values: Vec<f64> = log.values(stat).collect();
    if values.len() < VOLATILITY_MIN_GAMES {
        return ConvergenceFactor::neutral(FactorKey::Volatility);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean <= 0.0 || mean == line {
        return ConvergenceFactor::neutral(FactorKey::Volatility);
    }
    let variance =
        values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let cv = variance.sqrt() / mean;
    if cv >= CONSISTENT_CV {
        return ConvergenceFactor::neutral(FactorKey::Volatility);
    }
    let signal = if mean > line { Signal::Over } else { Signal::Under };
    let strength = (CONSISTENT_CV - cv) / CONSISTENT_CV;
    ConvergenceFactor::new(FactorKey::Volatility, signal, strength)
}

fn venue_split(ctx: &GameContext, log: &GameLog, stat: StatKind, line: f64) -> ConvergenceFactor {
    let venue: Vec<f64> = log
        .iter()
        .filter(|entry| entry.home == ctx.home)
        .filter_map(|entry| entry.value(stat))
        .collect();
    if venue.len() < SPLIT_MIN_GAMES {
        return ConvergenceFactor::neutral(FactorKey::HomeAwaySplit);
    }
    let average = venue.iter().sum::<f64>() / venue.len() as f64;
    edge(FactorKey::HomeAwaySplit, average, line)
}
