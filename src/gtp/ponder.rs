//! Background search scheduling between commands.
//!
//! Pondering is cooperative: the engine loop asks [`PonderScheduler::should_step`]
//! when it has no pending input and, if allowed, runs one bounded search batch.
//! [`PonderScheduler::poll`] is the same check, reporting the transition out
//! of a session as [`PonderPoll::Finished`] exactly once.
//! A session ends the first time the read or time limit is seen as crossed and
//! stays ended until the next `ponder` command or new game.

use std::fmt;
use std::time::{Duration, Instant};

use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PonderMode {
    Off,
    ReadLimited { limit: u64, count: u64 },
    TimeLimited { duration: Duration, deadline: Instant },
}

/// Outcome of one scheduling check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PonderPoll {
    /// Nothing to do: off, game over, or the session already ended.
    Idle,
    /// Run one background step.
    Step,
    /// The limit was crossed on this check; the session is now over.
    Finished,
}

/// A time limit whose deadline can't be represented from `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineOverflow(pub Duration);

impl fmt::Display for DeadlineOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ponder time limit of {:?} is out of range", self.0)
    }
}

impl std::error::Error for DeadlineOverflow {}

#[derive(Debug)]
pub struct PonderScheduler {
    mode: PonderMode,
    limit_reached: bool,
}

impl Default for PonderScheduler {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PonderScheduler {
    /// A scheduler that starts read-limited when `read_limit > 0`.
    #[must_use]
    pub fn new(read_limit: u64) -> Self {
        let mode = if read_limit > 0 {
            PonderMode::ReadLimited {
                limit: read_limit,
                count: 0,
            }
        } else {
            PonderMode::Off
        };
        PonderScheduler {
            mode,
            limit_reached: false,
        }
    }

    #[must_use]
    pub fn mode(&self) -> PonderMode {
        self.mode
    }

    #[must_use]
    pub fn limit_reached(&self) -> bool {
        self.limit_reached
    }

    pub fn set_off(&mut self) {
        self.mode = PonderMode::Off;
        self.limit_reached = true;
    }

    pub fn set_reads(&mut self, limit: u64) {
        self.mode = PonderMode::ReadLimited { limit, count: 0 };
        self.limit_reached = false;
    }

    /// Enter time-limited mode. On error the scheduler is unchanged.
    pub fn set_time(&mut self, duration: Duration, now: Instant) -> Result<(), DeadlineOverflow> {
        let deadline = now
            .checked_add(duration)
            .ok_or(DeadlineOverflow(duration))?;
        self.mode = PonderMode::TimeLimited { duration, deadline };
        self.limit_reached = false;
        Ok(())
    }

    /// Start a fresh session in the current mode (new game, or our own move).
    pub fn restart(&mut self, now: Instant) {
        match &mut self.mode {
            PonderMode::Off => return,
            PonderMode::ReadLimited { count, .. } => *count = 0,
            PonderMode::TimeLimited { duration, deadline } => match now.checked_add(*duration) {
                Some(next) => *deadline = next,
                None => {
                    warn!("{}", DeadlineOverflow(*duration));
                    self.limit_reached = true;
                    return;
                }
            },
        }
        self.limit_reached = false;
    }

    /// Add reads performed by one ponder step.
    pub fn record_reads(&mut self, delta: u64) {
        if let PonderMode::ReadLimited { count, .. } = &mut self.mode {
            *count = count.saturating_add(delta);
        }
    }

    /// Whether one more background step should run now.
    pub fn should_step(&mut self, game_over: bool, now: Instant) -> bool {
        match self.poll(game_over, now) {
            PonderPoll::Step => true,
            PonderPoll::Finished => {
                info!("ponder: done");
                false
            }
            PonderPoll::Idle => false,
        }
    }

    pub fn poll(&mut self, game_over: bool, now: Instant) -> PonderPoll {
        if game_over || self.limit_reached {
            return PonderPoll::Idle;
        }
        let finished = match self.mode {
            PonderMode::Off => return PonderPoll::Idle,
            PonderMode::ReadLimited { limit, count } => count >= limit,
            PonderMode::TimeLimited { deadline, .. } => now >= deadline,
        };
        if finished {
            self.limit_reached = true;
            return PonderPoll::Finished;
        }
        PonderPoll::Step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_never_steps() {
        let mut ponder = PonderScheduler::new(0);
        assert_eq!(ponder.mode(), PonderMode::Off);
        assert!(!ponder.should_step(false, Instant::now()));
        ponder.restart(Instant::now());
        assert!(!ponder.should_step(false, Instant::now()));
    }

    #[test]
    fn test_read_limit_reached_once() {
        let now = Instant::now();
        let mut ponder = PonderScheduler::new(0);
        ponder.set_reads(10);

        assert!(ponder.should_step(false, now));
        ponder.record_reads(4);
        assert!(ponder.should_step(false, now));
        ponder.record_reads(7);
        assert!(!ponder.limit_reached());
        assert!(!ponder.should_step(false, now));
        assert!(ponder.limit_reached());

        // Stays finished, even if more reads are somehow recorded.
        ponder.record_reads(100);
        assert!(!ponder.should_step(false, now));
    }

    #[test]
    fn test_initial_read_limit_from_options() {
        let mut ponder = PonderScheduler::new(5);
        assert_eq!(ponder.mode(), PonderMode::ReadLimited { limit: 5, count: 0 });
        assert!(ponder.should_step(false, Instant::now()));
    }

    #[test]
    fn test_time_limit() {
        let start = Instant::now();
        let mut ponder = PonderScheduler::new(0);
        ponder.set_time(Duration::from_secs(2), start).unwrap();

        assert!(ponder.should_step(false, start));
        assert!(ponder.should_step(false, start + Duration::from_millis(1999)));
        assert!(!ponder.should_step(false, start + Duration::from_secs(2)));
        assert!(ponder.limit_reached());
        assert!(!ponder.should_step(false, start));
    }

    #[test]
    fn test_off_mid_session() {
        let now = Instant::now();
        let mut ponder = PonderScheduler::new(100);
        assert!(ponder.should_step(false, now));
        ponder.set_off();
        assert!(!ponder.should_step(false, now));
        assert!(ponder.limit_reached());
    }

    #[test]
    fn test_game_over_blocks_stepping() {
        let mut ponder = PonderScheduler::new(100);
        assert!(!ponder.should_step(true, Instant::now()));
        assert!(!ponder.limit_reached());
    }

    #[test]
    fn test_restart_keeps_mode_and_resets_progress() {
        let start = Instant::now();
        let mut ponder = PonderScheduler::new(3);
        ponder.record_reads(3);
        assert!(!ponder.should_step(false, start));

        ponder.restart(start);
        assert_eq!(ponder.mode(), PonderMode::ReadLimited { limit: 3, count: 0 });
        assert!(ponder.should_step(false, start));

        ponder.set_time(Duration::from_secs(1), start).unwrap();
        let later = start + Duration::from_secs(5);
        assert!(!ponder.should_step(false, later));
        ponder.restart(later);
        assert!(ponder.should_step(false, later));
    }

    #[test]
    fn test_restart_after_off_stays_off() {
        let now = Instant::now();
        let mut ponder = PonderScheduler::new(3);
        ponder.set_off();
        ponder.restart(now);
        assert_eq!(ponder.mode(), PonderMode::Off);
        assert!(!ponder.should_step(false, now));
    }

    #[test]
    fn test_finished_reported_once_per_session() {
        let now = Instant::now();
        let mut ponder = PonderScheduler::new(6);
        let mut polls = Vec::new();
        for _ in 0..4 {
            let poll = ponder.poll(false, now);
            if poll == PonderPoll::Step {
                ponder.record_reads(4);
            }
            polls.push(poll);
        }
        assert_eq!(
            polls,
            vec![PonderPoll::Step, PonderPoll::Step, PonderPoll::Finished, PonderPoll::Idle]
        );

        ponder.restart(now);
        assert_eq!(ponder.poll(false, now), PonderPoll::Step);
        ponder.record_reads(6);
        assert_eq!(ponder.poll(false, now), PonderPoll::Finished);
        assert_eq!(ponder.poll(false, now), PonderPoll::Idle);
    }

    #[test]
    fn test_out_of_range_time_limit_is_rejected() {
        let now = Instant::now();
        let mut ponder = PonderScheduler::new(5);
        let huge = Duration::from_secs(u64::MAX);
        assert_eq!(ponder.set_time(huge, now), Err(DeadlineOverflow(huge)));
        assert_eq!(ponder.mode(), PonderMode::ReadLimited { limit: 5, count: 0 });
        assert!(ponder.should_step(false, now));
    }
}
