//! Top-picks board: scans every prop query in a snapshot and prints the ones
//! with enough factor convergence to surface.

use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use sharpline::file::FromJsonFile;
use sharpline::print;
use sharpline::provider::CachingProvider;
use sharpline::slate::{self, DEFAULT_MIN_SCORE};
use sharpline::snapshot::{Snapshot, SnapshotProvider};

/// Defense rankings barely move intra-day; cache them for the whole scan.
const DEFENSE_CACHE_TTL: Duration = Duration::from_secs(6 * 3600);

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// snapshot file holding the slate's queries and provider data
    file: Option<PathBuf>,

    /// minimum convergence score to surface
    #[clap(short = 'm', long, default_value_t = DEFAULT_MIN_SCORE)]
    min_score: usize,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        self.file
            .as_ref()
            .ok_or(anyhow!("snapshot file must be specified"))?;
        Ok(())
    }
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
    let queries = snapshot.queries.clone();
    if queries.is_empty() {
        return Err(anyhow!("snapshot contains no prop queries").into());
    }
    info!(
        "scanning {} props captured at {}",
        queries.len(),
        snapshot.captured_at
    );
    let provider = CachingProvider::new(SnapshotProvider::new(snapshot), DEFENSE_CACHE_TTL);

    let start_time = Instant::now();
    let picks = slate::scan_slate(&provider, &queries, args.min_score).await;
    let elapsed = start_time.elapsed();
    info!(
        "evaluated {} props in {}s",
        queries.len(),
        elapsed.as_millis() as f64 / 1_000.
    );

    if picks.is_empty() {
        info!("nothing converged at score >= {}", args.min_score);
    } else {
        info!(
            "top picks:\n{}",
            Console::default().render(&print::tabulate_picks(&picks))
        );
    }
    Ok(())
}
