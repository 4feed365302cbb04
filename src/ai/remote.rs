use tracing::debug;

use crate::error::MoveSourceError;
use crate::game::Board;

use super::source::{AbortHandle, MoveRequest, MoveSource};

/// Transport to a model-serving process.
pub trait ModelEndpoint: Send {
    /// Ask the model for a column. `Ok(None)` means the model saw no legal
    /// column.
    fn request_move(&mut self, request: &MoveRequest) -> Result<Option<i64>, MoveSourceError>;

    /// Kills whatever serves the requests, unblocking a pending one.
    fn abort_handle(&self) -> Option<AbortHandle> {
        None
    }
}

/// A move source backed by a separately hosted model.
pub struct RemoteModelMoveSource<E> {
    name: String,
    endpoint: E,
}

impl<E: ModelEndpoint> RemoteModelMoveSource<E> {
    pub fn new(name: impl Into<String>, endpoint: E) -> Self {
        RemoteModelMoveSource {
            name: name.into(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }
}

impl<E: ModelEndpoint> MoveSource for RemoteModelMoveSource<E> {
    fn get_move(
        &mut self,
        board: &Board,
        last_opponent_column: Option<usize>,
    ) -> Result<Option<i64>, MoveSourceError> {
        if let Some(col) = last_opponent_column {
            debug!(source = %self.name, human_column = col, "requesting model move");
        }

        let request = MoveRequest::new(board, last_opponent_column);
        let reply = self.endpoint.request_move(&request)?;

        debug!(source = %self.name, reply = ?reply, "model replied");
        Ok(reply)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn abort_handle(&self) -> Option<AbortHandle> {
        self.endpoint.abort_handle()
    }
}
