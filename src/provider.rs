//! Boundary to the external sports-statistics provider. The scoring core only
//! ever sees already-fetched data; this module owns the fan-out of the
//! per-prop sub-fetches and the partial-failure policy: a failed sub-fetch
//! degrades its factor to neutral instead of failing the evaluation.

use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use crate::cache::{Cache, MemoryCache};
use crate::domain::{DefenseRanking, GameLog, InjuryContext, Player, SeasonStats, StatKind};

#[async_trait]
pub trait SportsDataProvider: Send + Sync {
    async fn game_log(&self, player: &Player) -> anyhow::Result<GameLog>;

    async fn season_stats(
        &self,
        player: &Player,
        stat: StatKind,
    ) -> anyhow::Result<Option<SeasonStats>>;

    async fn defense_ranking(
        &self,
        team: &str,
        position: &str,
        stat: StatKind,
    ) -> anyhow::Result<Option<DefenseRanking>>;

    async fn injuries(&self, player: &Player) -> anyhow::Result<Vec<InjuryContext>>;
}

/// Everything the aggregator needs for one prop, post-degradation: always
/// usable, possibly partial.
#[derive(Clone, Debug)]
pub struct PropInputs {
    pub log: GameLog,
    pub season: Option<SeasonStats>,
    pub defense: Option<DefenseRanking>,
    pub injuries: Vec<InjuryContext>,
}

/// Fans out the four sub-fetches concurrently and joins with partial-failure
/// tolerance.
pub async fn fetch_prop_inputs(
    provider: &dyn SportsDataProvider,
    player: &Player,
    opponent: &str,
    stat: StatKind,
) -> PropInputs {
    let (log, season, defense, injuries) = tokio::join!(
        provider.game_log(player),
        provider.season_stats(player, stat),
        provider.defense_ranking(opponent, &player.position, stat),
        provider.injuries(player),
    );
    PropInputs {
        log: log.unwrap_or_else(|err| {
            warn!("game log fetch failed for {}: {err}", player.name);
            GameLog::empty()
        }),
        season: season.unwrap_or_else(|err| {
            warn!("season stats fetch failed for {}: {err}", player.name);
            None
        }),
        defense: defense.unwrap_or_else(|err| {
            warn!("defense ranking fetch failed for {opponent}: {err}");
            None
        }),
        injuries: injuries.unwrap_or_else(|err| {
            warn!("injury fetch failed for {}: {err}", player.name);
            vec![]
        }),
    }
}

/// Wraps a provider with a TTL cache on defense rankings, the lookup a slate
/// scan repeats most. The core stays cache-oblivious; this is caller policy.
pub struct CachingProvider<P> {
    inner: P,
    defense: MemoryCache<(String, String, StatKind), Option<DefenseRanking>>,
}
impl<P: SportsDataProvider> CachingProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            defense: MemoryCache::new(ttl),
        }
    }
}
#[async_trait]
impl<P: SportsDataProvider> SportsDataProvider for CachingProvider<P> {
    async fn game_log(&self, player: &Player) -> anyhow::Result<GameLog> {
        self.inner.game_log(player).await
    }

    async fn season_stats(
        &self,
        player: &Player,
        stat: StatKind,
    ) -> anyhow::Result<Option<SeasonStats>> {
        self.inner.season_stats(player, stat).await
    }

    async fn defense_ranking(
        &self,
        team: &str,
        position: &str,
        stat: StatKind,
    ) -> anyhow::Result<Option<DefenseRanking>> {
        let key = (team.to_string(), position.to_string(), stat);
        if let Some(hit) = self.defense.get(&key) {
            return Ok(hit);
        }
        let ranking = self.inner.defense_ranking(team, position, stat).await?;
        self.defense.put(key, ranking.clone());
        Ok(ranking)
    }

    async fn injuries(&self, player: &Player) -> anyhow::Result<Vec<InjuryContext>> {
        self.inner.injuries(player).await
    }
}
