use std::io::{self, BufReader};
use std::time::Duration;

use clap::Parser;

use gtp_engine::gtp::{EngineOptions, GtpEngine};
use gtp_engine::player::{PlayerOptions, PlayoutPlayer, MAX_BOARD_SIZE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Go Text Protocol engine", long_about = None)]
struct Args {
    /// Board size
    #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u8).range(1..=MAX_BOARD_SIZE as i64))]
    board_size: u8,

    /// Komi given to white
    #[arg(long, default_value_t = 7.5)]
    komi: f32,

    /// Readouts per move
    #[arg(long, default_value_t = PlayerOptions::default().num_readouts)]
    num_readouts: u32,

    /// Playouts per search batch
    #[arg(long, default_value_t = PlayerOptions::default().virtual_losses)]
    virtual_losses: u32,

    /// Think for this long per move instead of a fixed readout count
    #[arg(long, default_value_t = 0.0, value_parser = parse_seconds)]
    seconds_per_move: f64,

    /// Ponder up to this many reads while the opponent thinks (0 = off)
    #[arg(long, default_value_t = 0)]
    ponder_limit: u64,

    /// Pass when the opponent passes
    #[arg(long)]
    courtesy_pass: bool,

    /// Throw away search results after every move
    #[arg(long)]
    no_tree_reuse: bool,

    /// Random seed for reproducible play
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn parse_seconds(s: &str) -> Result<f64, String> {
    let seconds: f64 = s.parse().map_err(|e| format!("{e}"))?;
    Duration::try_from_secs_f64(seconds)
        .map(|_| seconds)
        .map_err(|_| format!("{s} is not a usable number of seconds"))
}

fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout carries only protocol responses.
    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .target(env_logger::Target::Stderr)
    .init();

    let player_options = PlayerOptions {
        num_readouts: args.num_readouts,
        virtual_losses: args.virtual_losses,
        seconds_per_move: args.seconds_per_move,
    };
    let engine_options = EngineOptions {
        ponder_limit: args.ponder_limit,
        courtesy_pass: args.courtesy_pass,
        tree_reuse: !args.no_tree_reuse,
    };
    let player = PlayoutPlayer::new(
        usize::from(args.board_size),
        args.komi,
        player_options,
        args.seed,
    );
    let mut engine = GtpEngine::new(player, engine_options);

    if let Err(e) = engine.run(BufReader::new(io::stdin()), io::stdout()) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
    // The input thread may still be parked in a read.
    std::process::exit(0);
}
