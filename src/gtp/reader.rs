//! Background reader feeding the line queue.
//!
//! Blocking reads happen on their own thread so the engine loop can ponder
//! while the client is silent. There is no portable way to interrupt a
//! blocked read, so the thread is never joined: the binary exits the
//! process once the engine loop returns.

use std::borrow::Cow;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use super::queue::LineQueue;
use crate::sync::StopFlag;

/// Spawn the reader thread.
///
/// Each line is pushed verbatim apart from its trailing `\n` / `\r\n`, with
/// invalid UTF-8 replaced by U+FFFD. On end of stream or a read error the
/// queue is closed.
pub fn spawn_reader<R>(
    input: R,
    queue: Arc<LineQueue>,
    stop: StopFlag,
) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("gtp-input".to_string())
        .spawn(move || read_lines(input, &queue, &stop))
}

fn read_lines<R: BufRead>(mut input: R, queue: &LineQueue, stop: &StopFlag) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => {
                debug!("input stream closed");
                break;
            }
            Ok(_) => {
                if stop.is_stopped() {
                    break;
                }
                let line = String::from_utf8_lossy(strip_line_ending(&buf));
                if matches!(line, Cow::Owned(_)) {
                    debug!("replaced invalid UTF-8 in input line");
                }
                queue.push(line.into_owned());
            }
            Err(e) => {
                warn!("error reading input: {e}");
                break;
            }
        }
    }
    queue.close();
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    #[test]
    fn test_reader_pushes_lines_then_closes() {
        let queue = Arc::new(LineQueue::new());
        let input = Cursor::new("1 name\r\n\n  genmove b \nquit");
        spawn_reader(input, Arc::clone(&queue), StopFlag::new())
            .unwrap()
            .join()
            .unwrap();

        assert!(queue.is_closed());
        let timeout = Duration::from_millis(10);
        assert_eq!(queue.pop_timeout(timeout).unwrap(), "1 name");
        assert_eq!(queue.pop_timeout(timeout).unwrap(), "");
        assert_eq!(queue.pop_timeout(timeout).unwrap(), "  genmove b ");
        assert_eq!(queue.pop_timeout(timeout).unwrap(), "quit");
        assert!(queue.is_exhausted());
    }

    #[test]
    fn test_reader_honors_stop_flag() {
        let queue = Arc::new(LineQueue::new());
        let stop = StopFlag::new();
        stop.stop();
        spawn_reader(Cursor::new("name\nquit\n"), Arc::clone(&queue), stop)
            .unwrap()
            .join()
            .unwrap();

        assert!(queue.is_empty());
        assert!(queue.is_closed());
    }

    #[test]
    fn test_reader_survives_invalid_utf8() {
        let queue = Arc::new(LineQueue::new());
        let input = Cursor::new(b"2 loadsgf caf\xe9.sgf\n3 name\nquit\n".to_vec());
        spawn_reader(input, Arc::clone(&queue), StopFlag::new())
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(queue.try_pop().unwrap(), "2 loadsgf caf\u{fffd}.sgf");
        assert_eq!(queue.try_pop().unwrap(), "3 name");
        assert_eq!(queue.try_pop().unwrap(), "quit");
        assert!(queue.is_exhausted());
    }
}
