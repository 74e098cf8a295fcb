//! Narrative detection: nine independent heuristics scanning a player's log
//! and tonight's context for qualitative signals. Every heuristic is a pure
//! function of its inputs; one that cannot reach its minimum sample simply
//! stays silent. The output order carries no meaning.

use serde::{Deserialize, Serialize};

use crate::domain::{
    GameContext, GameLog, GameResult, InjuryContext, InjuryImpact, InjurySide, InjuryStatus,
    Player, SeasonStats, StatKind,
};
use crate::rivalry;

/// Minimum head-to-head meetings before the elevated-vs-opponent read counts.
pub const ELEVATED_MIN_MEETINGS: usize = 3;
/// Elevation over season average that triggers the flag, and the high-severity cutoff.
pub const ELEVATED_PCT: f64 = 0.20;
pub const ELEVATED_HIGH_PCT: f64 = 0.30;
/// Career milestones checked ascending; first match wins.
pub const MILESTONES: [f64; 8] = [
    1_000.0, 2_000.0, 5_000.0, 10_000.0, 15_000.0, 20_000.0, 25_000.0, 30_000.0,
];
pub const MILESTONE_WINDOW: f64 = 100.0;
pub const MILESTONE_HIGH_WINDOW: f64 = 20.0;
/// Consecutive same-result games that make a streak, and the high-severity run.
pub const STREAK_MIN: usize = 4;
pub const STREAK_HIGH: usize = 7;
/// Fraction of the line the last game must have missed by, low side.
pub const BOUNCE_MISS_PCT: f64 = 0.4;
pub const BOUNCE_HIGH_PCT: f64 = 0.6;
/// Days between the two most recent games that suggest a layoff.
pub const ABSENCE_MIN_DAYS: i64 = 7;
pub const ABSENCE_HIGH_DAYS: i64 = 14;
/// Rest days that constitute an advantage, and the high-severity cutoff.
pub const REST_ADVANTAGE_DAYS: u32 = 3;
pub const REST_HIGH_DAYS: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FlagKind {
    ElevatedVsOpponent,
    MilestoneWatch,
    TeamStreak,
    BlowoutBounce,
    ReturnFromAbsence,
    BackToBackRoad,
    RestAdvantage,
    KeyTeammateOut,
    Rivalry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A point-in-time derived fact; created fresh per evaluation, never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NarrativeFlag {
    pub kind: FlagKind,
    pub headline: String,
    pub detail: String,
    pub impact: Impact,
    pub severity: Severity,
    pub historical_stat: Option<f64>,
}

/// Runs all nine heuristics. Never fails; insufficient data just means fewer
/// flags.
pub fn detect_narratives(
    player: &Player,
    ctx: &GameContext,
    log: &GameLog,
    season: Option<&SeasonStats>,
    injuries: &[InjuryContext],
    stat: StatKind,
    line: f64,
) -> Vec<NarrativeFlag> {
    let mut flags = vec![];
    flags.extend(elevated_vs_opponent(player, ctx, log, season, stat));
    flags.extend(milestone_watch(player, season, stat));
    flags.extend(team_streak(log));
    flags.extend(blowout_bounce(player, log, stat, line));
    flags.extend(return_from_absence(player, log));
    flags.extend(back_to_back_road(ctx));
    flags.extend(rest_advantage(ctx));
    flags.extend(key_teammates_out(injuries, stat));
    flags.extend(rivalry_game(player, ctx));
    flags
}

fn elevated_vs_opponent(
    player: &Player,
    ctx: &GameContext,
    log: &GameLog,
    season: Option<&SeasonStats>,
    stat: StatKind,
) -> Option<NarrativeFlag> {
    let season = season.filter(|season| season.average > 0.0)?;
    let meetings: Vec<f64> = log
        .iter()
        .filter(|entry| entry.opponent == ctx.opponent)
        .filter_map(|entry| entry.value(stat))
        .collect();
    if meetings.len() < ELEVATED_MIN_MEETINGS {
        return None;
    }
    let head_to_head = meetings.iter().sum::<f64>() / meetings.len() as f64;
    let elevation = head_to_head / season.average - 1.0;
    if elevation <= ELEVATED_PCT {
        return None;
    }
    let severity = if elevation > ELEVATED_HIGH_PCT {
        Severity::High
    } else {
        Severity::Medium
    };
    Some(NarrativeFlag {
        kind: FlagKind::ElevatedVsOpponent,
        headline: format!("{} elevates against the {}", player.name, ctx.opponent),
        detail: format!(
            "averages {head_to_head:.1} {stat} in {} meetings vs a {:.1} season average ({:+.0}%)",
            meetings.len(),
            season.average,
            elevation * 100.0
        ),
        impact: Impact::Positive,
        severity,
        historical_stat: Some(head_to_head),
    })
}

fn milestone_watch(
    player: &Player,
    season: Option<&SeasonStats>,
    stat: StatKind,
) -> Option<NarrativeFlag> {
    let career_total = season.and_then(|season| season.career_total)?;
    let milestone = MILESTONES
        .iter()
        .copied()
        .find(|&milestone| career_total < milestone && milestone - career_total <= MILESTONE_WINDOW)?;
    let remaining = milestone - career_total;
    let severity = if remaining <= MILESTONE_HIGH_WINDOW {
        Severity::High
    } else {
        Severity::Medium
    };
    Some(NarrativeFlag {
        kind: FlagKind::MilestoneWatch,
        headline: format!("{} approaching {milestone:.0} career {stat}", player.name),
        detail: format!("{remaining:.0} short of the milestone; extra motivation and minutes tend to follow"),
        impact: Impact::Positive,
        severity,
        historical_stat: Some(career_total),
    })
}

fn team_streak(log: &GameLog) -> Option<NarrativeFlag> {
    let first = log.most_recent()?;
    let streak = log
        .iter()
        .take_while(|entry| entry.result == first.result)
        .count();
    if streak < STREAK_MIN {
        return None;
    }
    let severity = if streak >= STREAK_HIGH {
        Severity::High
    } else {
        Severity::Medium
    };
    let (headline, detail) = match first.result {
        GameResult::Win => (
            format!("Team riding a {streak}-game win streak"),
            "winning teams tighten rotations; starter minutes can compress late".into(),
        ),
        GameResult::Loss => (
            format!("Team on a {streak}-game losing skid"),
            "losing stretches bring extended minutes and garbage-time variance".into(),
        ),
    };
    Some(NarrativeFlag {
        kind: FlagKind::TeamStreak,
        headline,
        detail,
        impact: Impact::Neutral,
        severity,
        historical_stat: None,
    })
}

fn blowout_bounce(
    player: &Player,
    log: &GameLog,
    stat: StatKind,
    line: f64,
) -> Option<NarrativeFlag> {
    let last = log.most_recent()?.value(stat)?;
    let miss = line - last;
    if miss <= BOUNCE_MISS_PCT * line.abs() {
        return None;
    }
    let severity = if miss > BOUNCE_HIGH_PCT * line.abs() {
        Severity::High
    } else {
        Severity::Medium
    };
    Some(NarrativeFlag {
        kind: FlagKind::BlowoutBounce,
        headline: format!("{} is a bounce-back candidate", player.name),
        detail: format!("last game produced {last:.1} {stat} against a {line:.1} line"),
        impact: Impact::Positive,
        severity,
        historical_stat: Some(last),
    })
}

fn return_from_absence(player: &Player, log: &GameLog) -> Option<NarrativeFlag> {
    let [latest, previous] = [log.first()?, log.get(1)?];
    let gap = (latest.date - previous.date).num_days();
    if gap < ABSENCE_MIN_DAYS {
        return None;
    }
    let severity = if gap >= ABSENCE_HIGH_DAYS {
        Severity::High
    } else {
        Severity::Medium
    };
    Some(NarrativeFlag {
        kind: FlagKind::ReturnFromAbsence,
        headline: format!("{} recently returned from a {gap}-day layoff", player.name),
        detail: "possible injury return; a minutes restriction may still apply".into(),
        impact: Impact::Negative,
        severity,
        historical_stat: None,
    })
}

fn back_to_back_road(ctx: &GameContext) -> Option<NarrativeFlag> {
    if !(ctx.back_to_back && !ctx.home) {
        return None;
    }
    Some(NarrativeFlag {
        kind: FlagKind::BackToBackRoad,
        headline: "Second night of a road back-to-back".into(),
        detail: "travel plus zero rest is the toughest scheduling spot in the league".into(),
        impact: Impact::Negative,
        severity: Severity::High,
        historical_stat: None,
    })
}

fn rest_advantage(ctx: &GameContext) -> Option<NarrativeFlag> {
    if ctx.rest_days < REST_ADVANTAGE_DAYS {
        return None;
    }
    let severity = if ctx.rest_days >= REST_HIGH_DAYS {
        Severity::High
    } else {
        Severity::Medium
    };
    Some(NarrativeFlag {
        kind: FlagKind::RestAdvantage,
        headline: format!("Coming in on {} days' rest", ctx.rest_days),
        detail: "fresh legs; rested players historically outperform their averages".into(),
        impact: Impact::Positive,
        severity,
        historical_stat: None,
    })
}

fn key_teammates_out(injuries: &[InjuryContext], stat: StatKind) -> Vec<NarrativeFlag> {
    injuries
        .iter()
        .filter(|injury| {
            injury.team == InjurySide::Teammate
                && injury.status == InjuryStatus::Out
                && injury.impact == InjuryImpact::High
        })
        .map(|injury| {
            let impact = if stat.is_usage_driven() {
                Impact::Positive
            } else {
                Impact::Neutral
            };
            NarrativeFlag {
                kind: FlagKind::KeyTeammateOut,
                headline: format!("{} is out", injury.player_name),
                detail: injury.relevance.clone(),
                impact,
                severity: Severity::High,
                historical_stat: None,
            }
        })
        .collect()
}

fn rivalry_game(player: &Player, ctx: &GameContext) -> Option<NarrativeFlag> {
    if !rivalry::are_rivals(player.sport, &player.team, &ctx.opponent) {
        return None;
    }
    Some(NarrativeFlag {
        kind: FlagKind::Rivalry,
        headline: format!("Rivalry game vs the {}", ctx.opponent),
        detail: "rivalry games run hotter and less predictable than the averages suggest".into(),
        impact: Impact::Neutral,
        severity: Severity::Medium,
        historical_stat: None,
    })
}
