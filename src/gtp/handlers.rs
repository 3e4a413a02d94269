//! Command handlers and the table that registers them.

use std::path::Path;
use std::time::{Duration, Instant};

use log::{error, info};

use super::engine::{GtpEngine, ENGINE_NAME};
use super::registry::{check_exact, check_range, CommandRegistry};
use super::response::Response;
use super::GtpError;
use crate::player::{Color, Coord, Player};

type CmdResult = Result<Response, GtpError>;

pub(super) fn build_registry<P: Player>() -> CommandRegistry<GtpEngine<P>> {
    let mut registry: CommandRegistry<GtpEngine<P>> = CommandRegistry::new();
    registry.register("benchmark", GtpEngine::cmd_benchmark);
    registry.register("boardsize", GtpEngine::cmd_boardsize);
    registry.register("clear_board", GtpEngine::cmd_clear_board);
    registry.register("final_score", GtpEngine::cmd_final_score);
    registry.register("genmove", GtpEngine::cmd_genmove);
    registry.register("known_command", GtpEngine::cmd_known_command);
    registry.register("komi", GtpEngine::cmd_komi);
    registry.register("list_commands", GtpEngine::cmd_list_commands);
    registry.register("loadsgf", GtpEngine::cmd_loadsgf);
    registry.register("name", GtpEngine::cmd_name);
    registry.register("play", GtpEngine::cmd_play);
    registry.register("ponder", GtpEngine::cmd_ponder);
    registry.register("quit", GtpEngine::cmd_quit);
    registry.register("readouts", GtpEngine::cmd_readouts);
    registry.register("showboard", GtpEngine::cmd_showboard);
    registry.register("undo", GtpEngine::cmd_undo);
    registry
}

impl<P: Player> GtpEngine<P> {
    /// `benchmark [readouts] [virtual_losses]`: one timed search with
    /// temporary settings. Without arguments the current settings are used.
    fn cmd_benchmark(&mut self, args: &[&str]) -> CmdResult {
        check_range(0, 2, args)?;

        let saved = self.player.options();
        let mut temp = saved;
        if let Some(raw) = args.first() {
            temp.seconds_per_move = 0.0;
            temp.num_readouts = raw
                .parse()
                .map_err(|_| GtpError::invalid("bad num_readouts"))?;
        }
        if let Some(raw) = args.get(1) {
            temp.virtual_losses = raw
                .parse()
                .map_err(|_| GtpError::invalid("bad virtual_losses"))?;
        }

        let before = self.player.current_state().read_count;
        let start = Instant::now();
        self.player.set_options(temp);
        let best = self.player.suggest_move(temp.num_readouts);
        self.player.set_options(saved);

        let reads = self.player.current_state().read_count.saturating_sub(before);
        info!(
            "benchmark: {reads} reads in {:.3}s, best move {best}",
            start.elapsed().as_secs_f64()
        );
        Ok(Response::ok())
    }

    fn cmd_boardsize(&mut self, args: &[&str]) -> CmdResult {
        check_exact(1, args)?;
        args[0]
            .parse::<usize>()
            .ok()
            .filter(|&size| size == self.player.board_size())
            .map(|_| Response::ok())
            .ok_or_else(|| GtpError::invalid("unacceptable size"))
    }

    fn cmd_clear_board(&mut self, args: &[&str]) -> CmdResult {
        check_exact(0, args)?;
        self.new_game();
        Ok(Response::ok())
    }

    fn cmd_final_score(&mut self, args: &[&str]) -> CmdResult {
        check_exact(0, args)?;
        if self.player.current_state().game_over {
            Ok(Response::ok_with(self.player.result_string()))
        } else {
            Ok(Response::ok_with(self.player.score_string()))
        }
    }

    fn cmd_genmove(&mut self, args: &[&str]) -> CmdResult {
        check_range(0, 1, args)?;
        let state = self.player.current_state();
        if state.game_over {
            return Err(GtpError::illegal("game is over"));
        }
        if let Some(raw) = args.first() {
            let color = Color::from_gtp(raw).ok_or_else(|| GtpError::invalid("illegal move"))?;
            if color != state.to_play {
                return Err(GtpError::illegal("out of turn moves are not yet supported"));
            }
        }

        let coord = if self.options.courtesy_pass && state.last_move == Some(Coord::Pass) {
            Coord::Pass
        } else {
            if !self.options.tree_reuse {
                self.player.clear_children();
            }
            let num_readouts = self.player.options().num_readouts;
            self.player.suggest_move(num_readouts)
        };
        info!(
            "genmove {coord} after {} reads",
            self.player.current_state().read_count
        );

        if !self.player.play_move(coord) {
            error!("player rejected its own move {coord}");
            return Err(GtpError::Collaborator("illegal move".to_string()));
        }
        self.ponder.restart(Instant::now());
        Ok(Response::ok_with(coord.to_string()))
    }

    fn cmd_known_command(&mut self, args: &[&str]) -> CmdResult {
        check_exact(1, args)?;
        let known = self.registry.contains(args[0]);
        Ok(Response::ok_with(if known { "true" } else { "false" }))
    }

    fn cmd_komi(&mut self, args: &[&str]) -> CmdResult {
        check_exact(1, args)?;
        let komi = f64::from(self.player.komi());
        args[0]
            .parse::<f64>()
            .ok()
            .filter(|&value| value == komi)
            .map(|_| Response::ok())
            .ok_or_else(|| GtpError::invalid("unacceptable komi"))
    }

    fn cmd_list_commands(&mut self, args: &[&str]) -> CmdResult {
        check_exact(0, args)?;
        Ok(Response::ok_with(self.registry.names().join("\n")))
    }

    fn cmd_loadsgf(&mut self, args: &[&str]) -> CmdResult {
        check_exact(1, args)?;
        let cannot_load = || GtpError::Collaborator("cannot load file".to_string());

        let moves = self.loader.load(Path::new(args[0])).map_err(|e| {
            error!("loadsgf {}: {e}", args[0]);
            cannot_load()
        })?;

        self.new_game();
        for mv in moves {
            if !self.player.play_move(mv.coord) {
                error!("couldn't play move {}", mv.coord);
                return Err(cannot_load());
            }
        }
        Ok(Response::ok())
    }

    fn cmd_name(&mut self, args: &[&str]) -> CmdResult {
        check_exact(0, args)?;
        Ok(Response::ok_with(format!(
            "{ENGINE_NAME}-{}",
            self.player.model_name()
        )))
    }

    fn cmd_play(&mut self, args: &[&str]) -> CmdResult {
        check_exact(2, args)?;
        let state = self.player.current_state();
        if state.game_over {
            return Err(GtpError::illegal("game is over"));
        }

        let color = Color::from_gtp(args[0]).ok_or_else(|| {
            error!("expected b or w for player color, got {}", args[0]);
            GtpError::invalid("illegal move")
        })?;
        if color != state.to_play {
            return Err(GtpError::illegal("out of turn moves are not yet supported"));
        }

        let coord = Coord::from_gtp(args[1], self.player.board_size(), true).ok_or_else(|| {
            error!("expected GTP coord for move, got {}", args[1]);
            GtpError::invalid("illegal move")
        })?;
        if !self.player.play_move(coord) {
            return Err(GtpError::illegal("illegal move"));
        }
        Ok(Response::ok())
    }

    /// `ponder off`, `ponder reads N` or `ponder time SECONDS`.
    fn cmd_ponder(&mut self, args: &[&str]) -> CmdResult {
        check_range(1, 2, args)?;
        if args[0] == "off" {
            self.ponder.set_off();
            self.options.ponder_limit = 0;
            return Ok(Response::ok());
        }

        check_exact(2, args)?;
        match args[0] {
            "reads" => {
                let limit = args[1]
                    .parse::<u64>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| GtpError::invalid("couldn't parse read limit"))?;
                self.options.ponder_limit = limit;
                self.ponder.set_reads(limit);
                Ok(Response::ok())
            }
            "time" => {
                let duration = args[1]
                    .parse::<f64>()
                    .ok()
                    .filter(|&secs| secs > 0.0)
                    .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                    .ok_or_else(|| GtpError::invalid("couldn't parse time limit"))?;
                self.ponder
                    .set_time(duration, Instant::now())
                    .map_err(|e| {
                        error!("{e}");
                        GtpError::invalid("couldn't parse time limit")
                    })?;
                Ok(Response::ok())
            }
            _ => Err(GtpError::invalid("unrecognized ponder mode")),
        }
    }

    fn cmd_quit(&mut self, args: &[&str]) -> CmdResult {
        check_exact(0, args)?;
        Ok(Response::done())
    }

    fn cmd_readouts(&mut self, args: &[&str]) -> CmdResult {
        check_exact(1, args)?;
        let readouts = args[0]
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                GtpError::invalid(format!("couldn't parse {} as an integer > 0", args[0]))
            })?;
        let mut options = self.player.options();
        options.num_readouts = readouts;
        self.player.set_options(options);
        Ok(Response::ok())
    }

    fn cmd_showboard(&mut self, args: &[&str]) -> CmdResult {
        check_exact(0, args)?;
        let board = self.player.current_state().pretty_board;
        Ok(Response::ok_with(format!("\n{board}")))
    }

    fn cmd_undo(&mut self, args: &[&str]) -> CmdResult {
        check_exact(0, args)?;
        if !self.player.undo_move() {
            return Err(GtpError::illegal("cannot undo"));
        }
        if !self.options.tree_reuse {
            self.player.clear_children();
        }
        Ok(Response::ok())
    }
}
