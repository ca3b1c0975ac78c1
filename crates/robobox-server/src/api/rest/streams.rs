//! Server-sent change events

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt};
use robobox_store::ChangeEvent;
use std::convert::Infallible;
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::warn;

/// One SSE event per store change, named after the change kind
pub(super) fn change_stream(
    receiver: broadcast::Receiver<ChangeEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(receiver).filter_map(|message| async move {
        match message {
            Ok(change) => match Event::default().event(change.kind.as_str()).json_data(&change) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    warn!("Dropping unencodable change event: {}", e);
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!("Change stream subscriber lagged, skipped {} event(s)", skipped);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
