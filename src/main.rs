use std::io;
use std::path::PathBuf;

use anyhow::Context;
use chopsticks::cli::{self, PlayOptions};
use chopsticks::core::{default_settings_path, init_logging, load_config, save_config};
use chopsticks_engine::{api, CpuMode, GameState, Session, Side};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "chopsticks",
    version,
    about = "Play chopsticks against a minimax cpu, or ask it for moves and hints"
)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fixed seed for reproducible cpu play
    #[arg(long)]
    seed: Option<u64>,

    /// Search on the calling thread instead of a background worker
    #[arg(long)]
    inline: bool,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a match in the terminal (default)
    Play {
        /// weakest | normal | hard | strong
        #[arg(short, long, default_value_t = CpuMode::Normal)]
        mode: CpuMode,
        /// Let the cpu open
        #[arg(long)]
        cpu_first: bool,
        /// Do not search cpu replies while you think
        #[arg(long)]
        no_ponder: bool,
        /// Show a hint before each of your moves
        #[arg(long)]
        auto_hint: bool,
    },
    /// Best line for the player from a position such as 1,1:1,1
    Hint {
        #[arg(value_parser = cli::parse_state)]
        state: GameState,
    },
    /// The cpu's move from a position such as 1,1:1,1
    Bestmove {
        #[arg(value_parser = cli::parse_state)]
        state: GameState,
        #[arg(short, long, default_value_t = CpuMode::Strong)]
        mode: CpuMode,
    },
    /// Legal moves for one side
    Moves {
        #[arg(value_parser = cli::parse_state)]
        state: GameState,
        #[arg(short, long, value_parser = cli::parse_side, default_value = "player")]
        side: Side,
    },
    /// Print the effective settings as JSON
    Config {
        /// Also write them to the settings file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose)?;

    let mut config = load_config(args.config.as_deref());
    if let Some(seed) = args.seed {
        config.rng_seed = Some(seed);
    }
    if args.inline {
        config.background_search = false;
    }

    let cmd = args.cmd.unwrap_or(Command::Play {
        mode: CpuMode::Normal,
        cpu_first: false,
        no_ponder: false,
        auto_hint: false,
    });

    match cmd {
        Command::Play {
            mode,
            cpu_first,
            no_ponder,
            auto_hint,
        } => {
            let turn = if cpu_first { Side::Cpu } else { Side::Player };
            let mut session = Session::from_position(config, mode, GameState::initial(), turn)
                .context("could not start a match")?;
            let options = PlayOptions {
                ponder: !no_ponder,
                auto_hint,
            };
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            let summary = cli::run_match(&mut session, stdin.lock(), &mut stdout, options)?;
            info!(
                "[SESSION] match over after {} plies (winner: {:?})",
                summary.plies, summary.winner
            );
        }
        Command::Hint { state } => {
            let hint = api::hint(state, &config);
            print!("{}", cli::render_state(&state));
            print!("{}", cli::render_hint(&hint));
        }
        Command::Bestmove { state, mode } => match api::scheduled_move(state, mode, &config) {
            Some(mv) => println!("{}", mv),
            None => println!("pass"),
        },
        Command::Moves { state, side } => {
            print!("{}", cli::render_moves(&api::moves_for(&state, side)));
        }
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                let path = args.config.unwrap_or_else(default_settings_path);
                save_config(&config, &path)
                    .with_context(|| format!("could not save settings to {}", path.display()))?;
            }
        }
    }
    Ok(())
}
