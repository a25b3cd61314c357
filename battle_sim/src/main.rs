//! battle_sim - Run a battle described by a TOML setup and print the result
//!
//! ```text
//! battle_sim <setup.toml> [--effects <effects.toml>] [--seed <n>] [--text]
//! ```
//!
//! The report goes to stdout as JSON (or a narrated transcript with `--text`);
//! diagnostics go to stderr and are filtered with `RUST_LOG`.

mod narrate;

use battle_core::config::{load_battle_setup, load_effect_registry};
use battle_core::{Battle, EffectRegistry};
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

/// Simulate a battle from a TOML setup
#[derive(Parser)]
#[command(name = "battle_sim")]
#[command(version, long_about = None)]
struct Args {
    /// Battle setup with both rosters
    #[arg(value_name = "SETUP")]
    setup: PathBuf,

    /// Effect catalogue (defaults to the built-in registry)
    #[arg(short, long, value_name = "EFFECTS")]
    effects: Option<PathBuf>,

    /// RNG seed, overriding the one in the setup
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print a narrated transcript instead of JSON
    #[arg(short, long)]
    text: bool,
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

    let setup = load_battle_setup(&args.setup)?;
    let registry = match &args.effects {
        Some(path) => load_effect_registry(path)?,
        None => EffectRegistry::with_defaults(),
    };

    // Unpinned runs still log their seed so they can be replayed
    let seed = args.seed.or(setup.seed).unwrap_or_else(rand::random);
    tracing::info!(
        setup = %args.setup.display(),
        seed,
        attackers = setup.attackers.len(),
        defenders = setup.defenders.len(),
        "starting battle"
    );

    let battle = Battle::seeded(&setup.attackers, &setup.defenders, &registry, setup.config(), seed)?;
    let names = narrate::Names::from_battle(&battle);
    let report = battle.run();

    if args.text {
        for line in narrate::transcript(&report, &names) {
            println!("{}", line);
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
