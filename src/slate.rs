//! The nightly "top picks" board: runs the aggregator across a whole slate of
//! (player, stat, line) queries. Work proceeds in small concurrent batches;
//! a failing item degrades to a low-confidence evaluation on its own, never
//! taking the batch down with it.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::convergence::{self, ConvergenceResult};
use crate::domain::{GameContext, Player, StatKind};
use crate::provider::{self, SportsDataProvider};

/// Batch width for concurrent evaluation. Sized empirically: wide enough to
/// hide fetch latency, narrow enough to stay under provider rate limits.
pub const BATCH_SIZE: usize = 10;
/// Picks below this convergence score never surface on the board.
pub const DEFAULT_MIN_SCORE: usize = 4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropQuery {
    pub player: Player,
    pub game: GameContext,
    pub stat: StatKind,
    pub line: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopPick {
    pub query: PropQuery,
    pub result: ConvergenceResult,
}

/// Evaluates every query and returns the picks at or above `min_score`,
/// strongest first (ties ordered by player name, then stat, for a stable
/// board).
pub async fn scan_slate(
    provider: &dyn SportsDataProvider,
    queries: &[PropQuery],
    min_score: usize,
) -> Vec<TopPick> {
    let mut picks = Vec::with_capacity(queries.len());
    for batch in queries.chunks(BATCH_SIZE) {
        debug!("evaluating batch of {}", batch.len());
        let evaluated = join_all(batch.iter().map(|query| evaluate_query(provider, query))).await;
        picks.extend(evaluated);
    }
    picks.retain(|pick| pick.result.score >= min_score);
    picks.sort_by(|a, b| {
        b.result
            .score
            .cmp(&a.result.score)
            .then_with(|| a.query.player.name.cmp(&b.query.player.name))
            .then_with(|| a.query.stat.to_string().cmp(&b.query.stat.to_string()))
    });
    info!("slate scan surfaced {} of {} props", picks.len(), queries.len());
    picks
}

async fn evaluate_query(provider: &dyn SportsDataProvider, query: &PropQuery) -> TopPick {
    let inputs = provider::fetch_prop_inputs(
        provider,
        &query.player,
        &query.game.opponent,
        query.stat,
    )
    .await;
    let result = convergence::evaluate(
        &query.player,
        &query.game,
        &inputs.log,
        inputs.season.as_ref(),
        inputs.defense.as_ref(),
        &inputs.injuries,
        query.stat,
        query.line,
    );
    TopPick {
        query: query.clone(),
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DefenseRanking, GameLog, InjuryContext, SeasonStats};
    use crate::testing::{log, player};
    use anyhow::bail;
    use async_trait::async_trait;

    /// Knows one hot player; errors on one; shrugs at everyone else.
    struct SlateProvider;
    #[async_trait]
    impl SportsDataProvider for SlateProvider {
        async fn game_log(&self, player: &Player) -> anyhow::Result<GameLog> {
            match player.name.as_str() {
                "Jayson Tatum" => Ok(log(&[
                    28.0, 30.0, 27.0, 29.0, 31.0, 28.0, 30.0, 29.0, 27.0, 31.0,
                ])),
                "Flaky Feed" => bail!("upstream timeout"),
                _ => Ok(GameLog::empty()),
            }
        }

        async fn season_stats(
            &self,
            player: &Player,
            stat: StatKind,
        ) -> anyhow::Result<Option<SeasonStats>> {
            Ok(SeasonStats::from_log(&self.game_log(player).await?, stat))
        }

        async fn defense_ranking(
            &self,
            _team: &str,
            _position: &str,
            stat: StatKind,
        ) -> anyhow::Result<Option<DefenseRanking>> {
            Ok(Some(DefenseRanking {
                team: "Miami Heat".into(),
                position: "SG".into(),
                stat,
                rank: 28,
                average_allowed: 24.0,
            }))
        }

        async fn injuries(&self, _player: &Player) -> anyhow::Result<Vec<InjuryContext>> {
            Ok(vec![])
        }
    }

    fn query(name: &str) -> PropQuery {
        PropQuery {
            player: player(name),
            game: GameContext {
                opponent: "Miami Heat".into(),
                home: true,
                rest_days: 1,
                back_to_back: false,
            },
            stat: StatKind::Points,
            line: 24.5,
        }
    }

    #[tokio::test]
    async fn surfaces_only_converged_picks() {
        let queries = vec![query("Jayson Tatum"), query("Bench Guy")];
        let picks = scan_slate(&SlateProvider, &queries, DEFAULT_MIN_SCORE).await;
        assert_eq!(1, picks.len());
        assert_eq!("Jayson Tatum", picks[0].query.player.name);
        assert!(picks[0].result.score >= DEFAULT_MIN_SCORE);
    }

    #[tokio::test]
    async fn provider_failure_is_isolated_per_item() {
        let queries = vec![query("Flaky Feed"), query("Jayson Tatum")];
        let picks = scan_slate(&SlateProvider, &queries, DEFAULT_MIN_SCORE).await;
        // the flaky item degrades and fails the threshold; the good one survives
        assert_eq!(1, picks.len());
        assert_eq!("Jayson Tatum", picks[0].query.player.name);
    }

    #[tokio::test]
    async fn zero_threshold_returns_everything_in_stable_order() {
        let queries = vec![query("Zed"), query("Jayson Tatum"), query("Abe")];
        let picks = scan_slate(&SlateProvider, &queries, 0).await;
        assert_eq!(3, picks.len());
        // strongest first, then alphabetical among equals
        assert_eq!("Jayson Tatum", picks[0].query.player.name);
        assert_eq!("Abe", picks[1].query.player.name);
        assert_eq!("Zed", picks[2].query.player.name);
    }

    #[tokio::test]
    async fn batches_cover_more_than_one_chunk() {
        let queries: Vec<_> = (0..(BATCH_SIZE * 2 + 3))
            .map(|index| query(&format!("Player {index:02}")))
            .collect();
        let picks = scan_slate(&SlateProvider, &queries, 0).await;
        assert_eq!(queries.len(), picks.len());
    }
}
