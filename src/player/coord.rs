//! Colors and board coordinates in GTP notation.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Column letters used by GTP. `I` is skipped.
const GTP_COLUMNS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

/// Largest board the notation can address.
pub const MAX_BOARD_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Color {
    Black,
    White,
}

impl Color {
    #[must_use]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Parse a GTP color by its first character (`b`/`w`, any case).
    #[must_use]
    pub fn from_gtp(s: &str) -> Option<Color> {
        match s.chars().next()?.to_ascii_lowercase() {
            'b' => Some(Color::Black),
            'w' => Some(Color::White),
            _ => None,
        }
    }

    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }
}

/// A move location.
///
/// `row` counts from the bottom edge, so `Point { col: 3, row: 3 }` is `D4`
/// on any board size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Coord {
    Pass,
    Resign,
    Point { col: u8, row: u8 },
}

impl Coord {
    /// Parse GTP notation (`D4`, `pass`, `resign`), case-insensitive.
    ///
    /// Returns `None` for anything off a `board_size` board, and for `resign`
    /// unless `allow_resign` is set.
    #[must_use]
    pub fn from_gtp(s: &str, board_size: usize, allow_resign: bool) -> Option<Coord> {
        if s.eq_ignore_ascii_case("pass") {
            return Some(Coord::Pass);
        }
        if s.eq_ignore_ascii_case("resign") {
            return allow_resign.then_some(Coord::Resign);
        }

        let mut chars = s.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let col = GTP_COLUMNS.iter().position(|&c| char::from(c) == letter)?;
        let number: usize = chars.as_str().parse().ok()?;
        if col >= board_size || number == 0 || number > board_size {
            return None;
        }
        Some(Coord::Point {
            col: u8::try_from(col).ok()?,
            row: u8::try_from(number - 1).ok()?,
        })
    }

    /// Coordinate for a flat board index where index 0 is the top-left point.
    #[must_use]
    pub fn from_index(index: usize, board_size: usize) -> Coord {
        let row = board_size - 1 - index / board_size;
        let col = index % board_size;
        Coord::Point {
            col: col as u8,
            row: row as u8,
        }
    }

    /// Flat board index (top-left is 0), or `None` for pass and resign.
    #[must_use]
    pub fn index(self, board_size: usize) -> Option<usize> {
        match self {
            Coord::Point { col, row } => {
                let (col, row) = (usize::from(col), usize::from(row));
                (col < board_size && row < board_size)
                    .then(|| (board_size - 1 - row) * board_size + col)
            }
            Coord::Pass | Coord::Resign => None,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coord::Pass => write!(f, "pass"),
            Coord::Resign => write!(f, "resign"),
            Coord::Point { col, row } => {
                let letter = char::from(GTP_COLUMNS[usize::from(*col)]);
                write!(f, "{letter}{}", usize::from(*row) + 1)
            }
        }
    }
}

/// A colored move, as read from a game record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub color: Color,
    pub coord: Coord,
}
