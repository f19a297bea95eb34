//! The read loop: response bytes to events to transcript updates.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use relaychat_contracts::StreamEvent;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};
use crate::sse::SseParser;
use crate::turn::{Turn, TurnState};

/// Snapshot republished to observers after every transcript change.
#[derive(Debug, Clone)]
pub struct TurnUpdate {
    pub transcript: String,
    pub state: TurnState,
}

impl TurnUpdate {
    pub fn initial() -> Self {
        Self {
            transcript: String::new(),
            state: TurnState::Pending,
        }
    }

    fn of(turn: &Turn) -> Self {
        Self {
            transcript: turn.transcript().to_string(),
            state: turn.state(),
        }
    }
}

/// Drive one turn to a terminal state.
///
/// Chunks append in arrival order. An `error` payload terminates the turn
/// once the current read has been fully processed. Cancellation stops
/// reading immediately and is a normal exit, not an error; an aborted turn
/// with an empty transcript gets the fixed "stopped" marker. The final
/// snapshot is returned on every non-failure path.
pub async fn consume_turn(
    body: impl Stream<Item = reqwest::Result<Bytes>>,
    updates: &watch::Sender<TurnUpdate>,
    cancel: &CancellationToken,
) -> Result<TurnUpdate> {
    let mut parser = SseParser::new();
    let mut turn = Turn::new();
    futures::pin_mut!(body);

    loop {
        let read = tokio::select! {
            _ = cancel.cancelled() => {
                turn.stop();
                let snapshot = TurnUpdate::of(&turn);
                let _ = updates.send(snapshot.clone());
                return Ok(snapshot);
            }
            read = body.next() => read,
        };

        let Some(read) = read else {
            break;
        };

        let bytes = match read {
            Ok(bytes) => bytes,
            Err(err) => {
                turn.fail();
                let _ = updates.send(TurnUpdate::of(&turn));
                return Err(ClientError::Network(err));
            }
        };

        let mut stream_error: Option<String> = None;
        for event in parser.push(&bytes) {
            match event {
                StreamEvent::Start => turn.begin(),
                StreamEvent::Chunk { content, .. } if !content.is_empty() => {
                    turn.append(&content);
                    let _ = updates.send(TurnUpdate::of(&turn));
                }
                StreamEvent::Chunk { .. } => {}
                StreamEvent::Complete => turn.complete(),
                StreamEvent::Error { error } => {
                    stream_error = Some(error);
                    break;
                }
            }
        }

        if let Some(error) = stream_error {
            turn.fail();
            let _ = updates.send(TurnUpdate::of(&turn));
            return Err(ClientError::Stream(error));
        }
    }

    turn.complete();
    let snapshot = TurnUpdate::of(&turn);
    let _ = updates.send(snapshot.clone());
    Ok(snapshot)
}
