//! Go position: stones, captures, ko, passes and area scoring.

use std::fmt;

use super::coord::{Color, Coord};

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    GameOver,
    OffBoard,
    Occupied,
    Ko,
    Suicide,
}

impl fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalMove::GameOver => write!(f, "game is over"),
            IllegalMove::OffBoard => write!(f, "point is off the board"),
            IllegalMove::Occupied => write!(f, "point is occupied"),
            IllegalMove::Ko => write!(f, "point is a ko recapture"),
            IllegalMove::Suicide => write!(f, "move is suicide"),
        }
    }
}

impl std::error::Error for IllegalMove {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    size: usize,
    /// Row-major, index 0 is the top-left point.
    stones: Vec<Option<Color>>,
    to_play: Color,
    ko: Option<usize>,
    consecutive_passes: u32,
    resigned: Option<Color>,
    last_move: Option<Coord>,
    move_number: u32,
}

impl Position {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Position {
            size,
            stones: vec![None; size * size],
            to_play: Color::Black,
            ko: None,
            consecutive_passes: 0,
            resigned: None,
            last_move: None,
            move_number: 0,
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn to_play(&self) -> Color {
        self.to_play
    }

    #[must_use]
    pub fn last_move(&self) -> Option<Coord> {
        self.last_move
    }

    #[must_use]
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// The side that resigned, if any.
    #[must_use]
    pub fn resigned(&self) -> Option<Color> {
        self.resigned
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.resigned.is_some() || self.consecutive_passes >= 2
    }

    #[must_use]
    pub fn stone_at(&self, index: usize) -> Option<Color> {
        self.stones.get(index).copied().flatten()
    }

    fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> {
        let size = self.size;
        let (row, col) = (index / size, index % size);
        let up = (row > 0).then(|| index - size);
        let down = (row + 1 < size).then(|| index + size);
        let left = (col > 0).then(|| index - 1);
        let right = (col + 1 < size).then(|| index + 1);
        [up, down, left, right].into_iter().flatten()
    }

    /// Stones of the group containing `index` and its liberty count.
    fn group(&self, index: usize) -> (Vec<usize>, usize) {
        let Some(color) = self.stone_at(index) else {
            return (Vec::new(), 0);
        };
        let mut seen = vec![false; self.stones.len()];
        let mut liberty_seen = vec![false; self.stones.len()];
        let mut stack = vec![index];
        let mut stones = Vec::new();
        let mut liberties = 0;
        seen[index] = true;

        while let Some(current) = stack.pop() {
            stones.push(current);
            for n in self.neighbors(current) {
                match self.stones[n] {
                    None if !liberty_seen[n] => {
                        liberty_seen[n] = true;
                        liberties += 1;
                    }
                    Some(c) if c == color && !seen[n] => {
                        seen[n] = true;
                        stack.push(n);
                    }
                    _ => {}
                }
            }
        }
        (stones, liberties)
    }

    /// Single-point eye of `color`: every neighbor is a `color` stone.
    #[must_use]
    pub fn is_eye(&self, index: usize, color: Color) -> bool {
        self.stones[index].is_none() && self.neighbors(index).all(|n| self.stones[n] == Some(color))
    }

    #[must_use]
    pub fn is_legal(&self, coord: Coord) -> bool {
        self.clone().play(coord).is_ok()
    }

    /// Legal board points for the side to play (pass not included).
    #[must_use]
    pub fn legal_points(&self) -> Vec<usize> {
        (0..self.stones.len())
            .filter(|&i| self.stones[i].is_none() && Some(i) != self.ko)
            .filter(|&i| self.clone().play_index(i).is_ok())
            .collect()
    }

    /// Play `coord` for the side to move.
    ///
    /// On error the position is unchanged.
    pub fn play(&mut self, coord: Coord) -> Result<(), IllegalMove> {
        if self.is_game_over() {
            return Err(IllegalMove::GameOver);
        }
        match coord {
            Coord::Pass => {
                self.consecutive_passes += 1;
                self.ko = None;
                self.finish_move(coord);
                Ok(())
            }
            Coord::Resign => {
                self.resigned = Some(self.to_play);
                self.finish_move(coord);
                Ok(())
            }
            Coord::Point { .. } => {
                let index = coord.index(self.size).ok_or(IllegalMove::OffBoard)?;
                self.play_index(index)
            }
        }
    }

    fn play_index(&mut self, index: usize) -> Result<(), IllegalMove> {
        if self.stones[index].is_some() {
            return Err(IllegalMove::Occupied);
        }
        if self.ko == Some(index) {
            return Err(IllegalMove::Ko);
        }

        let color = self.to_play;
        self.stones[index] = Some(color);

        let mut captured = Vec::new();
        let neighbors: Vec<usize> = self.neighbors(index).collect();
        for n in neighbors {
            if self.stones[n] == Some(color.opponent()) {
                let (stones, liberties) = self.group(n);
                if liberties == 0 {
                    for &s in &stones {
                        self.stones[s] = None;
                    }
                    captured.extend(stones);
                }
            }
        }

        let (own, own_liberties) = self.group(index);
        if own_liberties == 0 {
            self.stones[index] = None;
            return Err(IllegalMove::Suicide);
        }

        self.ko = if captured.len() == 1 && own.len() == 1 && own_liberties == 1 {
            Some(captured[0])
        } else {
            None
        };
        self.consecutive_passes = 0;
        self.finish_move(Coord::from_index(index, self.size));
        Ok(())
    }

    fn finish_move(&mut self, coord: Coord) {
        self.last_move = Some(coord);
        self.move_number += 1;
        self.to_play = self.to_play.opponent();
    }

    /// Area score from Black's point of view: stones plus empty regions that
    /// touch only one color, minus `komi`.
    #[must_use]
    pub fn score(&self, komi: f32) -> f32 {
        let mut black = 0i32;
        let mut white = 0i32;
        let mut visited = vec![false; self.stones.len()];

        for index in 0..self.stones.len() {
            match self.stones[index] {
                Some(Color::Black) => black += 1,
                Some(Color::White) => white += 1,
                None if !visited[index] => {
                    let (region, borders) = self.empty_region(index, &mut visited);
                    let count = region as i32;
                    match borders {
                        (true, false) => black += count,
                        (false, true) => white += count,
                        _ => {}
                    }
                }
                None => {}
            }
        }
        (black - white) as f32 - komi
    }

    /// Size of the empty region at `start` and whether it touches (black, white).
    fn empty_region(&self, start: usize, visited: &mut [bool]) -> (usize, (bool, bool)) {
        let mut stack = vec![start];
        visited[start] = true;
        let mut size = 0;
        let mut borders = (false, false);
        while let Some(current) = stack.pop() {
            size += 1;
            for n in self.neighbors(current) {
                match self.stones[n] {
                    Some(Color::Black) => borders.0 = true,
                    Some(Color::White) => borders.1 = true,
                    None if !visited[n] => {
                        visited[n] = true;
                        stack.push(n);
                    }
                    None => {}
                }
            }
        }
        (size, borders)
    }

    /// Text diagram, top row first, with column letters and row numbers.
    #[must_use]
    pub fn to_pretty_string(&self) -> String {
        let letters: String = (0..self.size)
            .filter_map(|col| Coord::from_index(col, self.size).to_string().chars().next())
            .map(|c| format!(" {c}"))
            .collect();
        let mut out = format!("   {letters}\n");
        for row in 0..self.size {
            let label = self.size - row;
            out.push_str(&format!("{label:>2} "));
            for col in 0..self.size {
                let index = row * self.size + col;
                let symbol = match self.stones[index] {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                out.push(' ');
                out.push(symbol);
            }
            out.push_str(&format!(" {label:>2}\n"));
        }
        out.push_str(&format!("   {letters}"));
        out
    }
}
