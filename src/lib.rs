//! A heuristic convergence scoring engine for player-prop betting lines.
//! Turns a player's history, an upcoming matchup and situational context into
//! a bounded edge score with an over/under call, and dissects settled bets
//! after the fact. Advisory and explainable by design; every output carries
//! the factors behind it.

#![allow(clippy::too_many_arguments)]

pub mod autopsy;
pub mod cache;
pub mod convergence;
pub mod domain;
pub mod file;
pub mod narrative;
pub mod print;
pub mod provider;
pub mod rivalry;
pub mod situations;
pub mod slate;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
