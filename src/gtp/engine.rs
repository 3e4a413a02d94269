//! The GTP engine loop.
//!
//! Priority on every iteration: a queued command first, then one pondering
//! step, then a short blocking wait for input. Commands and pondering both
//! run on the calling thread; only line reading happens elsewhere.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::command::parse_line;
use super::handlers::build_registry;
use super::options::EngineOptions;
use super::ponder::PonderScheduler;
use super::queue::{LineQueue, PopTimeoutError};
use super::reader::spawn_reader;
use super::registry::{dispatch, CommandRegistry};
use super::response::Response;
use crate::player::Player;
use crate::sgf::{GameLoader, SgfLoader};
use crate::sync::StopFlag;

/// Prefix of the `name` reply.
pub const ENGINE_NAME: &str = "gtp_engine";

/// How long an idle, non-pondering loop blocks on input before re-checking.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct GtpEngine<P: Player> {
    pub(super) player: P,
    pub(super) loader: Box<dyn GameLoader>,
    pub(super) options: EngineOptions,
    pub(super) ponder: PonderScheduler,
    pub(super) registry: Arc<CommandRegistry<GtpEngine<P>>>,
    idle_poll: Duration,
}

impl<P: Player> GtpEngine<P> {
    #[must_use]
    pub fn new(player: P, options: EngineOptions) -> Self {
        GtpEngine {
            player,
            loader: Box::new(SgfLoader),
            ponder: PonderScheduler::new(options.ponder_limit),
            options,
            registry: Arc::new(build_registry()),
            idle_poll: IDLE_POLL_INTERVAL,
        }
    }

    /// Replace the game-record loader used by `loadsgf`.
    #[must_use]
    pub fn with_loader(mut self, loader: Box<dyn GameLoader>) -> Self {
        self.loader = loader;
        self
    }

    #[must_use]
    pub fn with_idle_poll(mut self, idle_poll: Duration) -> Self {
        self.idle_poll = idle_poll;
        self
    }

    #[must_use]
    pub fn player(&self) -> &P {
        &self.player
    }

    #[must_use]
    pub fn ponder(&self) -> &PonderScheduler {
        &self.ponder
    }

    #[must_use]
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Registered command names, sorted.
    #[must_use]
    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    /// Serve `input` until `quit` or until the input is closed and drained.
    ///
    /// The reader thread is left running if it is blocked in a read; callers
    /// that need a clean exit should end the process after this returns.
    pub fn run<R, W>(&mut self, input: R, mut output: W) -> io::Result<()>
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        self.warm_up();

        let queue = Arc::new(LineQueue::new());
        let stop = StopFlag::new();
        let _reader = spawn_reader(input, Arc::clone(&queue), stop.clone())?;

        let result = self.serve(&queue, &mut output);
        stop.stop();
        result
    }

    /// The scheduling loop over an already-fed queue.
    pub fn serve<W: Write>(&mut self, queue: &LineQueue, output: &mut W) -> io::Result<()> {
        self.new_game();
        loop {
            if let Some(line) = queue.try_pop() {
                if self.respond(&line, output)? {
                    break;
                }
                continue;
            }
            if queue.is_exhausted() {
                info!("input closed");
                break;
            }
            if self.maybe_ponder() {
                continue;
            }
            match queue.pop_timeout(self.idle_poll) {
                Ok(line) => {
                    if self.respond(&line, output)? {
                        break;
                    }
                }
                Err(PopTimeoutError::Timeout) => {}
                Err(PopTimeoutError::Closed) => {
                    info!("input closed");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Decode and dispatch one input line. Blank lines produce no response.
    pub fn handle_line(&mut self, line: &str) -> Option<Response> {
        let command = parse_line(line)?;
        debug!("gtp command: {line}");
        let args = command.arg_refs();
        let registry = Arc::clone(&self.registry);
        let response = dispatch(&registry, self, &command.name, &args);
        Some(response.with_id(command.id))
    }

    /// Handle `line`, write its reply, and report whether the loop should end.
    fn respond<W: Write>(&mut self, line: &str, output: &mut W) -> io::Result<bool> {
        let Some(response) = self.handle_line(line) else {
            return Ok(false);
        };
        write!(output, "{response}")?;
        output.flush()?;
        Ok(response.done)
    }

    fn warm_up(&mut self) {
        info!("Warming up...");
        if let Err(e) = self.player.warm_up() {
            warn!("{e}");
        }
        info!("GTP engine ready");
    }

    pub(super) fn new_game(&mut self) {
        self.player.new_game();
        self.ponder.restart(Instant::now());
    }

    /// Run one pondering step if the scheduler allows it.
    pub fn maybe_ponder(&mut self) -> bool {
        let state = self.player.current_state();
        if !self.ponder.should_step(state.game_over, Instant::now()) {
            return false;
        }
        self.ponder_step(state.read_count);
        true
    }

    fn ponder_step(&mut self, before: u64) {
        let virtual_losses = self.player.options().virtual_losses;
        self.player.tree_search(virtual_losses, u32::MAX);
        let after = self.player.current_state().read_count;
        self.ponder.record_reads(after.saturating_sub(before));
    }
}
