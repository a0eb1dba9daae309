//! Battle Sim - headless skirmish runner for combat_core
//!
//! Loads a roster, places every creature on the board and ticks the arena until
//! one side is eliminated or the tick limit is reached.

use clap::Parser;
use combat_core::config::load_base_stats;
use combat_core::prelude::*;
use std::error::Error;
use std::path::PathBuf;
use tracing::{info, warn};

/// Run a seeded skirmish from a roster file
#[derive(Parser, Debug)]
#[command(name = "battle_sim")]
#[command(about = "Simulate a creature skirmish", long_about = None)]
#[command(version)]
struct Args {
    /// Roster TOML describing the creatures and their placements
    #[arg(short, long, default_value = "battle_sim/rosters/skirmish.toml")]
    roster: PathBuf,

    /// Override the bundled base stats
    #[arg(long)]
    base_stats: Option<PathBuf>,

    /// Seed for every random draw
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Stop after this many ticks even without a winner
    #[arg(short, long, default_value_t = 600)]
    ticks: u32,

    /// Milliseconds of game time per tick
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Print the executed effect log as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let roster = load_roster(&args.roster)?;
    info!(path = %args.roster.display(), creatures = roster.creatures.len(), "roster loaded");

    let mut arena = Arena::new(SeededRandom::new(args.seed)).with_constants(roster.constants.clone());
    if let Some(path) = &args.base_stats {
        arena = arena.with_defaults(load_base_stats(path)?);
    }

    for (data, board) in roster.creature_data()? {
        let name = data.name.clone();
        let id = arena.add_creature(data, board);
        info!(creature = %id, %name, rank = board.rank, file = board.file, "placed");
    }

    let mut ticks = 0;
    let winner = loop {
        if let Some(winner) = arena.winner() {
            break Some(winner);
        }
        if ticks >= args.ticks {
            break None;
        }
        arena.tick(args.tick_ms);
        ticks += 1;
    };

    match winner {
        Some(winner) => info!(?winner, ticks, time_ms = arena.now().as_millis(), "battle decided"),
        None => warn!(ticks, "tick limit reached without a winner"),
    }
    for creature in arena.creatures() {
        info!(
            creature = %creature.id,
            name = creature.name(),
            owner = ?creature.owner(),
            health = creature.current_health(),
            "survivor"
        );
    }
    info!(enemies_removed = arena.enemies_removed(), effects = arena.effect_log().len(), "summary");

    if args.json {
        println!("{}", arena.effect_log_json()?);
    }
    Ok(())
}
