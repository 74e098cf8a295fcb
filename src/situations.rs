//! Historical situational matching: finds comparable past games for tonight's
//! context using a three-tier relaxation (exact, relaxed, broad). A tier wins
//! by producing at least [`MIN_MATCHES`] comparables; anything smaller is
//! statistically meaningless for this product and falls through to the next
//! tier, or to `None`.

use serde::{Deserialize, Serialize};

use crate::domain::{DefenseRanking, DefenseTier, GameContext, GameLog, GameLogEntry, Player, RestTier, StatKind};

/// Entry guard: logs shorter than this cannot be matched at all.
pub const MIN_LOG_GAMES: usize = 10;
/// Hard floor on the comparable group size. Not a tunable default.
pub const MIN_MATCHES: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarSituationsResult {
    pub description: String,
    pub matching_games: usize,
    pub avg_value: f64,
    pub hit_rate: f64,
    pub avg_margin: f64,
}

/// The constraints a tier applies. `Exact` also pins the rest tier; `Broad`
/// keeps only the venue.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Tier {
    Exact,
    Relaxed,
    Broad,
}

pub fn find_similar_situations(
    player: &Player,
    ctx: &GameContext,
    log: &GameLog,
    defense: Option<&DefenseRanking>,
    stat: StatKind,
    line: f64,
) -> Option<SimilarSituationsResult> {
    if log.len() < MIN_LOG_GAMES {
        return None;
    }
    let defense_tier = defense.map(DefenseRanking::tier);
    // the "current" rest tier is read off the most recent game, the freshest
    // observation of how the team is being scheduled
    let rest_tier = log.most_recent().map(GameLogEntry::rest_tier);

    let tiers: &[Tier] = match defense_tier {
        Some(_) => &[Tier::Exact, Tier::Relaxed, Tier::Broad],
        None => &[Tier::Broad],
    };
    for &tier in tiers {
        let matches: Vec<(f64, &GameLogEntry)> = log
            .iter()
            .filter(|entry| matches_tier(entry, tier, ctx.home, defense_tier, rest_tier))
            .filter_map(|entry| entry.value(stat).map(|value| (value, entry)))
            .collect();
        if matches.len() >= MIN_MATCHES {
            return Some(summarise(player, ctx, tier, defense_tier, rest_tier, &matches, line));
        }
    }
    None
}

fn matches_tier(
    entry: &GameLogEntry,
    tier: Tier,
    home: bool,
    defense_tier: Option<DefenseTier>,
    rest_tier: Option<RestTier>,
) -> bool {
    if entry.home != home {
        return false;
    }
    match tier {
        Tier::Exact => {
            entry.defense_tier() == defense_tier && Some(entry.rest_tier()) == rest_tier
        }
        Tier::Relaxed => entry.defense_tier() == defense_tier,
        Tier::Broad => true,
    }
}

fn summarise(
    player: &Player,
    ctx: &GameContext,
    tier: Tier,
    defense_tier: Option<DefenseTier>,
    rest_tier: Option<RestTier>,
    matches: &[(f64, &GameLogEntry)],
    line: f64,
) -> SimilarSituationsResult {
    let venue = if ctx.home { "at home" } else { "on the road" };
    let mut description = format!("{} {venue}", player.name);
    if tier != Tier::Broad {
        if let Some(defense_tier) = defense_tier {
            let band = match defense_tier {
                DefenseTier::Top => "top-10",
                DefenseTier::Mid => "mid-tier",
                DefenseTier::Bottom => "bottom-10",
            };
            description.push_str(&format!(" vs {band} defenses"));
        }
    }
    if tier == Tier::Exact {
        if let Some(rest_tier) = rest_tier {
            description.push_str(&format!(" on {rest_tier}"));
        }
    }

    let count = matches.len() as f64;
    let avg_value = matches.iter().map(|(value, _)| value).sum::<f64>() / count;
    let hits = matches.iter().filter(|(value, _)| *value > line).count();
    let avg_margin = matches.iter().map(|(value, _)| value - line).sum::<f64>() / count;
    SimilarSituationsResult {
        description,
        matching_games: matches.len(),
        avg_value,
        hit_rate: hits as f64 / count,
        avg_margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{log, player};
    use assert_float_eq::*;

    fn ctx(home: bool) -> GameContext {
        GameContext {
            opponent: "Miami Heat".into(),
            home,
            rest_days: 1,
            back_to_back: false,
        }
    }

    fn defense(rank: u32) -> DefenseRanking {
        DefenseRanking {
            team: "Miami Heat".into(),
            position: "SG".into(),
            stat: StatKind::Points,
            rank,
            average_allowed: 22.5,
        }
    }

    #[test]
    fn below_entry_guard_returns_none() {
        let log = log(&[20.0; 9]);
        let result = find_similar_situations(
            &player("Jayson Tatum"),
            &ctx(true),
            &log,
            Some(&defense(5)),
            StatKind::Points,
            20.0,
        );
        assert_eq!(None, result);
    }

    #[test]
    fn exact_tier_wins_when_populated() {
        // all fixture games are home, rank 15 (mid), normal rest; a mid-rank
        // defense tonight makes the exact tier match everything
        let log = log(&[22.0, 25.0, 18.0, 30.0, 21.0, 19.0, 24.0, 26.0, 17.0, 28.0]);
        let result = find_similar_situations(
            &player("Jayson Tatum"),
            &ctx(true),
            &log,
            Some(&defense(15)),
            StatKind::Points,
            21.5,
        )
        .unwrap();
        assert_eq!(10, result.matching_games);
        assert_float_absolute_eq!(23.0, result.avg_value, 1e-9);
        assert_float_absolute_eq!(0.6, result.hit_rate, 1e-9);
        assert_float_absolute_eq!(1.5, result.avg_margin, 1e-9);
        assert_eq!(
            "Jayson Tatum at home vs mid-tier defenses on normal rest",
            result.description
        );
    }

    #[test]
    fn relaxed_tier_drops_rest_constraint() {
        // most recent game is a back-to-back, so the exact tier demands b2b
        // comparables and starves; the relaxed tier ignores rest
        let mut entries: Vec<_> = log(&[22.0, 25.0, 18.0, 30.0, 21.0, 19.0, 24.0, 26.0, 17.0, 28.0])
            .to_vec();
        entries[0].back_to_back = true;
        let log = GameLog::new(entries).unwrap();
        let result = find_similar_situations(
            &player("Jayson Tatum"),
            &ctx(true),
            &log,
            Some(&defense(15)),
            StatKind::Points,
            21.5,
        )
        .unwrap();
        assert_eq!(10, result.matching_games);
        assert_eq!("Jayson Tatum at home vs mid-tier defenses", result.description);
    }

    #[test]
    fn broad_tier_keeps_venue_only() {
        // a top-tier defense tonight never matches the mid-rank history, so
        // only the broad tier can fill the group
        let log = log(&[22.0, 25.0, 18.0, 30.0, 21.0, 19.0, 24.0, 26.0, 17.0, 28.0]);
        let result = find_similar_situations(
            &player("Jayson Tatum"),
            &ctx(true),
            &log,
            Some(&defense(3)),
            StatKind::Points,
            21.5,
        )
        .unwrap();
        assert_eq!("Jayson Tatum at home", result.description);
    }

    #[test]
    fn missing_defense_ranking_goes_straight_to_broad() {
        let log = log(&[22.0, 25.0, 18.0, 30.0, 21.0, 19.0, 24.0, 26.0, 17.0, 28.0]);
        let result = find_similar_situations(
            &player("Jayson Tatum"),
            &ctx(true),
            &log,
            None,
            StatKind::Points,
            21.5,
        )
        .unwrap();
        assert_eq!("Jayson Tatum at home", result.description);
    }

    #[test]
    fn venue_starvation_returns_none() {
        // ten home games but tonight is a road game: even the broad tier
        // cannot reach five matches
        let log = log(&[22.0, 25.0, 18.0, 30.0, 21.0, 19.0, 24.0, 26.0, 17.0, 28.0]);
        let result = find_similar_situations(
            &player("Jayson Tatum"),
            &ctx(false),
            &log,
            Some(&defense(15)),
            StatKind::Points,
            21.5,
        );
        assert_eq!(None, result);
    }

    #[test]
    fn road_description() {
        let mut entries: Vec<_> = log(&[22.0, 25.0, 18.0, 30.0, 21.0, 19.0, 24.0, 26.0, 17.0, 28.0])
            .to_vec();
        for entry in &mut entries {
            entry.home = false;
        }
        let log = GameLog::new(entries).unwrap();
        let result = find_similar_situations(
            &player("Jayson Tatum"),
            &ctx(false),
            &log,
            Some(&defense(25)),
            StatKind::Points,
            21.5,
        )
        .unwrap();
        // rank 25 tonight vs rank-15 history: broad tier, road venue
        assert_eq!("Jayson Tatum on the road", result.description);
    }

    #[test]
    fn never_returns_fewer_than_five_matches() {
        // 10 games, only 4 recorded the stat in question
        let mut entries: Vec<_> = log(&[22.0; 10]).to_vec();
        for entry in entries.iter_mut().take(6) {
            entry.stats.clear();
        }
        let log = GameLog::new(entries).unwrap();
        let result = find_similar_situations(
            &player("Jayson Tatum"),
            &ctx(true),
            &log,
            Some(&defense(15)),
            StatKind::Points,
            21.5,
        );
        assert_eq!(None, result);
    }
}
