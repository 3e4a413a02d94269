//! Flat Monte-Carlo player.
//!
//! Every legal root move (plus pass) is an arm of a UCB1 bandit; each read
//! plays the arm and finishes the game with random non-eye-filling moves.
//! Weak, but it exercises the whole engine without a network or a tree.

use std::time::{Duration, Instant};

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::coord::{Color, Coord};
use super::position::Position;
use super::{Player, PlayerError, PlayerOptions, PlayerState};

const UCB_EXPLORATION: f64 = 1.0;

/// Playouts are cut off after this many moves per board point.
const PLAYOUT_MOVES_PER_POINT: usize = 3;

/// GTP-style score string: `B+3.5`, `W+0.5`, or `0` for a draw.
#[must_use]
pub fn format_score(score: f32) -> String {
    if score > 0.0 {
        format!("B+{score:.1}")
    } else if score < 0.0 {
        format!("W+{:.1}", -score)
    } else {
        "0".to_string()
    }
}

#[derive(Debug, Clone)]
struct Arm {
    coord: Coord,
    visits: u32,
    wins: u32,
}

impl Arm {
    fn ucb(&self, total: u64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = f64::from(self.visits);
        let mean = f64::from(self.wins) / visits;
        mean + UCB_EXPLORATION * ((total.max(1) as f64).ln() / visits).sqrt()
    }
}

#[derive(Debug, Default)]
struct Root {
    arms: Vec<Arm>,
    visits: u64,
}

pub struct PlayoutPlayer {
    position: Position,
    history: Vec<Position>,
    komi: f32,
    options: PlayerOptions,
    root: Root,
    rng: StdRng,
}

impl PlayoutPlayer {
    #[must_use]
    pub fn new(board_size: usize, komi: f32, options: PlayerOptions, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        PlayoutPlayer {
            position: Position::new(board_size),
            history: Vec::new(),
            komi,
            options,
            root: Root::default(),
            rng,
        }
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    fn expand_root(&mut self) {
        if !self.root.arms.is_empty() {
            return;
        }
        let size = self.position.size();
        self.root.arms = self
            .position
            .legal_points()
            .into_iter()
            .map(|i| Coord::from_index(i, size))
            .chain(std::iter::once(Coord::Pass))
            .map(|coord| Arm {
                coord,
                visits: 0,
                wins: 0,
            })
            .collect();
    }

    fn select_arm(&self) -> usize {
        let total = self.root.visits;
        let mut best = 0;
        let mut best_value = f64::NEG_INFINITY;
        for (i, arm) in self.root.arms.iter().enumerate() {
            let value = arm.ucb(total);
            if value > best_value {
                best = i;
                best_value = value;
            }
        }
        best
    }

    /// Play one arm and a random continuation; true if the side to move at
    /// the root won.
    fn read(&mut self, arm: usize) -> bool {
        let me = self.position.to_play();
        let mut game = self.position.clone();
        if game.play(self.root.arms[arm].coord).is_err() {
            return false;
        }
        random_playout(&mut game, &mut self.rng);
        let score = game.score(self.komi);
        match me {
            Color::Black => score > 0.0,
            Color::White => score < 0.0,
        }
    }

    fn reset_root(&mut self) {
        self.root = Root::default();
    }
}

/// Finish `position` with random legal moves that don't fill own eyes.
fn random_playout(position: &mut Position, rng: &mut StdRng) {
    let size = position.size();
    let points = size * size;
    for _ in 0..points * PLAYOUT_MOVES_PER_POINT {
        if position.is_game_over() {
            return;
        }
        let color = position.to_play();
        let mut candidates: Vec<usize> = (0..points)
            .filter(|&i| position.stone_at(i).is_none() && !position.is_eye(i, color))
            .collect();
        candidates.shuffle(rng);

        let played = candidates
            .into_iter()
            .any(|i| position.play(Coord::from_index(i, size)).is_ok());
        if !played && position.play(Coord::Pass).is_err() {
            return;
        }
    }
}

impl Player for PlayoutPlayer {
    fn warm_up(&mut self) -> Result<(), PlayerError> {
        let mut game = Position::new(self.position.size());
        random_playout(&mut game, &mut self.rng);
        if game.move_number() == 0 {
            return Err(PlayerError::WarmUp("playout made no moves".to_string()));
        }
        Ok(())
    }

    fn new_game(&mut self) {
        self.position = Position::new(self.position.size());
        self.history.clear();
        self.reset_root();
    }

    fn play_move(&mut self, coord: Coord) -> bool {
        let mut next = self.position.clone();
        if let Err(e) = next.play(coord) {
            debug!("rejected {coord}: {e}");
            return false;
        }
        self.history.push(std::mem::replace(&mut self.position, next));
        self.reset_root();
        true
    }

    fn undo_move(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.position = previous;
                self.reset_root();
                true
            }
            None => false,
        }
    }

    fn clear_children(&mut self) {
        self.reset_root();
    }

    fn current_state(&self) -> PlayerState {
        PlayerState {
            to_play: self.position.to_play(),
            game_over: self.position.is_game_over(),
            read_count: self.root.visits,
            last_move: self.position.last_move(),
            pretty_board: self.position.to_pretty_string(),
        }
    }

    fn suggest_move(&mut self, num_readouts: u32) -> Coord {
        if self.position.is_game_over() {
            return Coord::Pass;
        }
        let virtual_losses = self.options.virtual_losses;
        let budget = Duration::try_from_secs_f64(self.options.seconds_per_move)
            .ok()
            .filter(|budget| !budget.is_zero());
        if let Some(budget) = budget {
            let start = Instant::now();
            while start.elapsed() < budget {
                self.tree_search(virtual_losses, u32::MAX);
            }
        } else {
            let target = self.root.visits + u64::from(num_readouts);
            while self.root.visits < target {
                let remaining = u32::try_from(target - self.root.visits).unwrap_or(u32::MAX);
                self.tree_search(virtual_losses, remaining);
            }
        }

        self.root
            .arms
            .iter()
            .max_by_key(|arm| arm.visits)
            .map_or(Coord::Pass, |arm| arm.coord)
    }

    fn tree_search(&mut self, virtual_losses: u32, max_readouts: u32) {
        if self.position.is_game_over() {
            return;
        }
        self.expand_root();
        let batch = virtual_losses.min(max_readouts).max(1);
        for _ in 0..batch {
            let arm = self.select_arm();
            let won = self.read(arm);
            let arm = &mut self.root.arms[arm];
            arm.visits += 1;
            arm.wins += u32::from(won);
            self.root.visits += 1;
        }
    }

    fn options(&self) -> PlayerOptions {
        self.options
    }

    fn set_options(&mut self, options: PlayerOptions) {
        self.options = options;
    }

    fn model_name(&self) -> &str {
        "playout"
    }

    fn score_string(&self) -> String {
        format_score(self.position.score(self.komi))
    }

    fn result_string(&self) -> String {
        match self.position.resigned() {
            Some(loser) => format!("{}+R", loser.opponent().letter()),
            None => self.score_string(),
        }
    }

    fn board_size(&self) -> usize {
        self.position.size()
    }

    fn komi(&self) -> f32 {
        self.komi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayoutPlayer {
        let options = PlayerOptions {
            num_readouts: 16,
            virtual_losses: 4,
            seconds_per_move: 0.0,
        };
        PlayoutPlayer::new(5, 0.5, options, Some(7))
    }

    fn coord(name: &str) -> Coord {
        Coord::from_gtp(name, 5, true).unwrap()
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(3.5), "B+3.5");
        assert_eq!(format_score(-0.5), "W+0.5");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn test_warm_up_succeeds() {
        assert!(player().warm_up().is_ok());
    }

    #[test]
    fn test_tree_search_is_bounded() {
        let mut player = player();
        player.tree_search(4, u32::MAX);
        assert_eq!(player.current_state().read_count, 4);
        player.tree_search(4, 2);
        assert_eq!(player.current_state().read_count, 6);
        player.tree_search(0, 0);
        assert_eq!(player.current_state().read_count, 7);
    }

    #[test]
    fn test_suggest_move_is_legal_and_not_played() {
        let mut player = player();
        let mv = player.suggest_move(16);
        assert!(player.current_state().read_count >= 16);
        assert_eq!(player.current_state().last_move, None);
        assert!(player.position().is_legal(mv));
        assert!(player.play_move(mv));
        assert_eq!(player.current_state().to_play, Color::White);
        // A move resets the root.
        assert_eq!(player.current_state().read_count, 0);
    }

    #[test]
    fn test_unusable_time_budget_falls_back_to_readouts() {
        for seconds in [f64::INFINITY, f64::NAN, -1.0, 1e300] {
            let mut player = player();
            player.set_options(PlayerOptions {
                seconds_per_move: seconds,
                ..player.options()
            });
            let mv = player.suggest_move(8);
            assert!(player.position().is_legal(mv));
            assert_eq!(player.current_state().read_count, 8);
        }
    }

    #[test]
    fn test_play_and_undo() {
        let mut player = player();
        assert!(!player.undo_move());
        assert!(player.play_move(coord("C3")));
        assert!(!player.play_move(coord("C3")));
        assert_eq!(player.current_state().last_move, Some(coord("C3")));
        assert!(player.undo_move());
        assert_eq!(player.current_state().last_move, None);
        assert_eq!(player.current_state().to_play, Color::Black);
    }

    #[test]
    fn test_results() {
        let mut player = player();
        assert_eq!(player.score_string(), "W+0.5");
        assert!(player.play_move(coord("C3")));
        assert_eq!(player.score_string(), "B+24.5");
        assert!(player.play_move(Coord::Resign));
        assert!(player.current_state().game_over);
        assert_eq!(player.result_string(), "B+R");
        assert_eq!(player.suggest_move(8), Coord::Pass);
    }

    #[test]
    fn test_new_game_resets() {
        let mut player = player();
        assert!(player.play_move(coord("C3")));
        player.new_game();
        assert_eq!(player.current_state().last_move, None);
        assert!(!player.undo_move());
    }
}
