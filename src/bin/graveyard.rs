//! Graveyard runner: autopsies every settled bet in a JSON file and prints
//! the verdicts.

use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use sharpline::autopsy::GraveyardEntry;
use sharpline::file::FromJsonFile;
use sharpline::print;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file holding the settled bets
    file: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        self.file
            .as_ref()
            .ok_or(anyhow!("graveyard file must be specified"))?;
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
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

    let entries = Vec::<GraveyardEntry>::from_json_file(args.file.unwrap())?;
    info!("autopsying {} settled bets", entries.len());
    for entry in &entries {
        let autopsy = entry.autopsy();
        info!(
            "{} {} {} {:.1} (landed {:.1}, convergence {}):\n{}",
            entry.player_name,
            entry.side,
            entry.stat,
            entry.line,
            entry.actual_value,
            entry.convergence,
            Console::default().render(&print::tabulate_autopsy(&autopsy))
        );
    }
    Ok(())
}
