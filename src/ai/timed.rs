use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::MoveSourceError;
use crate::game::Board;

use super::source::{AbortHandle, MoveSource};

type Reply = (u64, Result<Option<i64>, MoveSourceError>);

/// Runs another move source on a worker thread and gives up on it after a
/// fixed timeout.
///
/// On a timeout the inner source's [`AbortHandle`], if it has one, is fired
/// so a hung model server does not outlive the request. A late reply is
/// discarded when the next request is made.
pub struct TimedMoveSource {
    name: String,
    abort: Option<AbortHandle>,
    timeout: Duration,
    next_id: u64,
    requests: mpsc::Sender<(u64, Board, Option<usize>)>,
    replies: mpsc::Receiver<Reply>,
}

impl TimedMoveSource {
    pub fn new<S: MoveSource + 'static>(mut inner: S, timeout: Duration) -> Self {
        let name = inner.name().to_string();
        let abort = inner.abort_handle();
        let (request_tx, request_rx) = mpsc::channel::<(u64, Board, Option<usize>)>();
        let (reply_tx, reply_rx) = mpsc::channel::<Reply>();

        thread::spawn(move || {
            for (id, board, last) in request_rx {
                let reply = inner.get_move(&board, last);
                if reply_tx.send((id, reply)).is_err() {
                    break;
                }
            }
        });

        TimedMoveSource {
            name,
            abort,
            timeout,
            next_id: 0,
            requests: request_tx,
            replies: reply_rx,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl MoveSource for TimedMoveSource {
    fn get_move(
        &mut self,
        board: &Board,
        last_opponent_column: Option<usize>,
    ) -> Result<Option<i64>, MoveSourceError> {
        let id = self.next_id;
        self.next_id += 1;

        self.requests
            .send((id, *board, last_opponent_column))
            .map_err(|_| MoveSourceError::Unavailable(format!("{} worker has stopped", self.name)))?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.replies.recv_timeout(remaining) {
                Ok((reply_id, reply)) if reply_id == id => return reply,
                // Stale answer to a request that already timed out
                Ok(_) => continue,
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    warn!(source = %self.name, timeout = ?self.timeout, "move source timed out");
                    if let Some(abort) = &self.abort {
                        abort.abort();
                    }
                    return Err(MoveSourceError::Timeout(self.timeout));
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(MoveSourceError::Unavailable(format!(
                        "{} worker has stopped",
                        self.name
                    )));
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn abort_handle(&self) -> Option<AbortHandle> {
        self.abort.clone()
    }
}
