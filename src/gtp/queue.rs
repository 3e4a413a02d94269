//! Thread-safe FIFO of raw input lines.
//!
//! One producer (the input reader) and one consumer (the engine loop). The
//! queue is unbounded: a disciplined GTP client sends one command and waits
//! for its reply, so there is no backpressure.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Reason a timed pop returned without a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopTimeoutError {
    /// Nothing arrived before the timeout elapsed.
    Timeout,
    /// The queue is empty and the producer has closed it.
    Closed,
}

impl fmt::Display for PopTimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopTimeoutError::Timeout => write!(f, "timed out waiting for input"),
            PopTimeoutError::Closed => write!(f, "input closed"),
        }
    }
}

impl std::error::Error for PopTimeoutError {}

struct Inner {
    lines: VecDeque<String>,
    closed: bool,
}

pub struct LineQueue {
    inner: Mutex<Inner>,
    available: Condvar,
}

impl Default for LineQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl LineQueue {
    #[must_use]
    pub fn new() -> Self {
        LineQueue {
            inner: Mutex::new(Inner {
                lines: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Append a line at the tail and wake a waiting consumer.
    pub fn push(&self, line: String) {
        self.inner.lock().lines.push_back(line);
        self.available.notify_one();
    }

    /// Pop the head line without blocking.
    pub fn try_pop(&self) -> Option<String> {
        self.inner.lock().lines.pop_front()
    }

    /// Pop the head line, waiting at most `timeout` for one to arrive.
    ///
    /// Lines queued before the queue was closed are still returned; `Closed`
    /// is only reported once the queue is drained.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<String, PopTimeoutError> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        loop {
            if let Some(line) = inner.lines.pop_front() {
                return Ok(line);
            }
            if inner.closed {
                return Err(PopTimeoutError::Closed);
            }
            if self.available.wait_until(&mut inner, deadline).timed_out() {
                return inner.lines.pop_front().ok_or(PopTimeoutError::Timeout);
            }
        }
    }

    /// Mark the producer side as finished and wake every waiter.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.available.notify_all();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// True once the queue is closed and every queued line has been taken.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        let inner = self.inner.lock();
        inner.closed && inner.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
