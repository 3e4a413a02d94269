//! The search player the GTP engine drives.
//!
//! The engine only talks to a player through the [`Player`] trait: it never
//! looks inside the search tree or the board. [`PlayoutPlayer`] is the
//! player shipped with the binary.

mod coord;
mod playout;
mod position;

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use coord::{Color, Coord, Move, MAX_BOARD_SIZE};
pub use playout::{format_score, PlayoutPlayer};
pub use position::{IllegalMove, Position};

/// Search settings. A plain value, so callers can save, tweak and restore it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlayerOptions {
    /// Reads per `suggest_move` when no time budget is set.
    pub num_readouts: u32,
    /// Leaves evaluated per search batch.
    pub virtual_losses: u32,
    /// Time budget per move; 0 means use `num_readouts`.
    pub seconds_per_move: f64,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        PlayerOptions {
            num_readouts: 400,
            virtual_losses: 8,
            seconds_per_move: 0.0,
        }
    }
}

/// Snapshot of what the engine needs to know about the game.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub to_play: Color,
    pub game_over: bool,
    /// Cumulative reads at the root of the current search.
    pub read_count: u64,
    pub last_move: Option<Coord>,
    pub pretty_board: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// The player's first evaluation failed.
    WarmUp(String),
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerError::WarmUp(reason) => write!(f, "warm-up failed: {reason}"),
        }
    }
}

impl std::error::Error for PlayerError {}

/// Capabilities the GTP engine requires from a search player.
pub trait Player {
    /// Run one throwaway evaluation so the first real search isn't slowed
    /// by lazy initialization.
    fn warm_up(&mut self) -> Result<(), PlayerError>;

    fn new_game(&mut self);

    /// Play `coord` for the side to move. Returns false if it was rejected,
    /// in which case the game is unchanged.
    fn play_move(&mut self, coord: Coord) -> bool;

    /// Take back the last move. Returns false when there is nothing to undo.
    fn undo_move(&mut self) -> bool;

    /// Discard search results below the root.
    fn clear_children(&mut self);

    fn current_state(&self) -> PlayerState;

    /// Search and return the move to play, without playing it.
    fn suggest_move(&mut self, num_readouts: u32) -> Coord;

    /// One search call of at most `max_readouts` reads, batched by
    /// `virtual_losses`.
    fn tree_search(&mut self, virtual_losses: u32, max_readouts: u32);

    fn options(&self) -> PlayerOptions;

    fn set_options(&mut self, options: PlayerOptions);

    fn model_name(&self) -> &str;

    /// Current score estimate, e.g. `B+3.5`.
    fn score_string(&self) -> String;

    /// Final result once the game is over, e.g. `W+R`.
    fn result_string(&self) -> String;

    fn board_size(&self) -> usize;

    fn komi(&self) -> f32;
}
