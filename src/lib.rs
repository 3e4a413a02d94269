//! A Go Text Protocol engine runtime.
//!
//! [`gtp`] owns the protocol: line input, command dispatch, response
//! formatting and background pondering. [`player`] defines the search
//! capability the engine drives, with a small Monte-Carlo player to drive it.

pub mod gtp;
pub mod player;
pub mod sgf;
pub mod sync;

pub use gtp::{EngineOptions, GtpEngine, GtpError, Response};
pub use player::{Color, Coord, Player, PlayerOptions, PlayoutPlayer};
