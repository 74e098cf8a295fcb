//! Single-prop lookup: evaluates one (player, stat, line) against a captured
//! snapshot and prints the narrative flags, comparable situations and the
//! factor breakdown.

use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use sharpline::convergence;
use sharpline::domain::{GameContext, StatKind};
use sharpline::file::FromJsonFile;
use sharpline::narrative;
use sharpline::print;
use sharpline::provider;
use sharpline::situations;
use sharpline::snapshot::{Snapshot, SnapshotProvider};

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// snapshot file to source the provider data from
    file: Option<PathBuf>,

    /// player name as it appears in the snapshot
    #[clap(short = 'p', long)]
    player: String,

    /// stat category, e.g. points, rebounds, assists
    #[clap(short = 's', long, value_parser = parse_stat)]
    stat: StatKind,

    /// the posted line
    #[clap(short = 'l', long)]
    line: f64,

    /// tonight's opponent
    #[clap(short = 'o', long)]
    opponent: String,

    /// evaluate as a home game
    #[clap(long, default_value_t = false)]
    home: bool,

    /// days of rest coming in
    #[clap(long, default_value_t = 1)]
    rest_days: u32,

    /// second night of a back-to-back
    #[clap(long, default_value_t = false)]
    back_to_back: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        self.file
            .as_ref()
            .ok_or(anyhow!("snapshot file must be specified"))?;
        Ok(())
    }
}
fn parse_stat(s: &str) -> anyhow::Result<StatKind> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let snapshot = Snapshot::from_json_file(args.file.unwrap())?;
    info!(
        "snapshot captured at {} with {} players",
        snapshot.captured_at,
        snapshot.players.len()
    );
    let player = snapshot
        .players
        .iter()
        .map(|snapshot| &snapshot.player)
        .find(|player| player.name == args.player)
        .ok_or(anyhow!("player {} not in snapshot", args.player))?
        .clone();
    let provider = SnapshotProvider::new(snapshot);

    let ctx = GameContext {
        opponent: args.opponent,
        home: args.home,
        rest_days: args.rest_days,
        back_to_back: args.back_to_back,
    };
    let inputs = provider::fetch_prop_inputs(&provider, &player, &ctx.opponent, args.stat).await;

    let flags = narrative::detect_narratives(
        &player,
        &ctx,
        &inputs.log,
        inputs.season.as_ref(),
        &inputs.injuries,
        args.stat,
        args.line,
    );
    if flags.is_empty() {
        info!("no narrative flags");
    } else {
        info!(
            "narrative flags:\n{}",
            Console::default().render(&print::tabulate_flags(&flags))
        );
    }

    match situations::find_similar_situations(
        &player,
        &ctx,
        &inputs.log,
        inputs.defense.as_ref(),
        args.stat,
        args.line,
    ) {
        Some(situations) => info!(
            "{}: {} games, avg {:.1}, hit rate {:.0}%, avg margin {:+.1}",
            situations.description,
            situations.matching_games,
            situations.avg_value,
            situations.hit_rate * 100.0,
            situations.avg_margin
        ),
        None => info!("insufficient comparable situations"),
    }

    let result = convergence::evaluate(
        &player,
        &ctx,
        &inputs.log,
        inputs.season.as_ref(),
        inputs.defense.as_ref(),
        &inputs.injuries,
        args.stat,
        args.line,
    );
    info!(
        "factors:\n{}",
        Console::default().render(&print::tabulate_factors(&result))
    );
    info!(
        "{} {} {:.1}: {} ({}/{}, {:.0}% confidence)",
        player.name,
        args.stat,
        args.line,
        result.direction,
        result.score,
        convergence::NUM_FACTORS,
        result.confidence * 100.0
    );
    Ok(())
}
