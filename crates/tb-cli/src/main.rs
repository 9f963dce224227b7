//! CLI driver for the typing battle engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tb_engine::TypingResult;
use tb_engine::model::{AccuracyRating, SpeedRating};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tb",
    about = "Typing battle: validate skill data and run seeded auto-battles",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log every probability roll to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a skill catalog and report every issue
    Check {
        /// Skill catalog (JSON array of skills)
        catalog: PathBuf,
    },

    /// Run an automated battle between two combatants
    Simulate {
        /// Skill catalog (JSON array of skills)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Player combatant definition (JSON)
        #[arg(short, long)]
        player: PathBuf,

        /// Enemy combatant definition (JSON)
        #[arg(short, long)]
        enemy: PathBuf,

        /// RNG seed for a reproducible battle
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// World level used for drop rates
        #[arg(long, default_value = "1")]
        world_level: u32,

        /// Typing result the player submits every turn
        #[arg(short, long, value_enum, default_value = "none")]
        typing: TypingArg,

        /// Stop after this many turns without a winner
        #[arg(long, default_value = "200")]
        max_turns: u32,
    },

    /// Print a combatant's save snapshot as JSON
    Snapshot {
        /// Skill catalog (JSON array of skills)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Combatant definition (JSON)
        #[arg(long)]
        combatant: PathBuf,
    },
}

/// Fixed typing quality for automated battles.
#[derive(Clone, Copy, ValueEnum)]
enum TypingArg {
    /// No typing minigame
    None,
    /// Fast and perfect
    Perfect,
    /// Normal speed, good accuracy
    Good,
    /// Slow and sloppy
    Poor,
}

impl TypingArg {
    fn result(self) -> Option<TypingResult> {
        match self {
            Self::None => None,
            Self::Perfect => Some(TypingResult::rated(
                SpeedRating::Fast,
                AccuracyRating::Perfect,
            )),
            Self::Good => Some(TypingResult::rated(
                SpeedRating::Normal,
                AccuracyRating::Good,
            )),
            Self::Poor => Some(TypingResult::rated(SpeedRating::Slow, AccuracyRating::Poor)),
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { catalog } => commands::check::run(&catalog),
        Commands::Simulate {
            catalog,
            player,
            enemy,
            seed,
            world_level,
            typing,
            max_turns,
        } => commands::simulate::run(&commands::simulate::SimulateArgs {
            catalog: &catalog,
            player: &player,
            enemy: &enemy,
            seed,
            world_level,
            typing: typing.result(),
            max_turns,
        }),
        Commands::Snapshot { catalog, combatant } => {
            commands::snapshot::run(&catalog, &combatant)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
