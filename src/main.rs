//! Play a game with built-in agents and print the result.
//!
//! Usage:
//!   riichi_engine --seed 42 [--east-only] [--config game.json] \
//!                 [--yaku-table yaku.json] [--save final.json]

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use riichi_engine::{GameConfig, GameEngine, GameEvent, StepOutcome, YakuTable};

#[derive(Parser, Debug)]
#[command(name = "riichi_engine", about = "Simulate a riichi mahjong game with built-in agents")]
struct Args {
    /// Seed for shuffling and agent choices (overrides the config file).
    #[arg(long)]
    seed: Option<u64>,

    /// Play the East round only.
    #[arg(long)]
    east_only: bool,

    /// JSON game config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON yaku table replacing the built-in one.
    #[arg(long)]
    yaku_table: Option<PathBuf>,

    /// Write the final game state here.
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            GameConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.east_only |= args.east_only;

    let table = match &args.yaku_table {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            YakuTable::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => YakuTable::standard(),
    };

    info!("starting game with seed {}", config.seed);
    let mut engine = GameEngine::with_table(&config, table);
    match engine.run_game()? {
        StepOutcome::GameOver => {}
        StepOutcome::AwaitingInput(prompt) => {
            bail!("seat {} needs input ({prompt:?}); human seats are not supported here", prompt.seat())
        }
        other => bail!("game stopped early: {other:?}"),
    }

    for event in engine.drain_events() {
        match event {
            GameEvent::RoundStarted { label, dealer } => println!("{label} (dealer: seat {dealer})"),
            GameEvent::Won { winner, method, yaku, score } => {
                let limit = score.limit.map(|l| format!(" {}", l.name())).unwrap_or_default();
                println!(
                    "  seat {winner} wins by {method:?}: {} han {} fu{limit} {:?}",
                    score.han, score.fu, yaku
                );
            }
            GameEvent::DrawGame { tenpai } => println!("  exhaustive draw, tenpai: {tenpai:?}"),
            GameEvent::Aborted { reason } => println!("  aborted: {reason:?}"),
            GameEvent::ScoresChanged { scores, .. } => println!("  scores: {scores:?}"),
            _ => {}
        }
    }
    println!("final scores: {:?}", engine.state().scores());

    if let Some(path) = &args.save {
        fs::write(path, engine.save()?).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
