use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, Json};
use futures_util::{future, stream, Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;

use imgstream_core::{BatchEvent, BatchRunner};

use crate::AppState;

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": "0.1.0"
    }))
}

/// GET /sse
///
/// Opens a live progress stream. If no batch is running, this request starts
/// one; a concurrent request joins the feed of the batch already in flight.
/// One `data:` frame per converted file, in completion order; the stream
/// closes after the terminal event. Disconnecting never cancels the batch.
pub async fn progress(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before triggering so this connection cannot miss its own
    // batch's first events.
    let receiver = state.hub.subscribe();

    if state
        .active
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        let events = BatchRunner::new(state.config.clone()).start();
        let state = state.clone();
        tokio::spawn(async move {
            state.hub.forward(events).await;
            state.active.store(false, Ordering::SeqCst);
        });
    } else {
        log::debug!("batch already active, attaching subscriber to live feed");
    }

    let stream = BroadcastStream::new(receiver)
        // A lagged subscriber only hurts itself; skip the gap and keep going.
        .filter_map(|received| future::ready(received.ok()))
        .flat_map(|event| stream::iter(frames_for(event)))
        .take_while(|frame| future::ready(frame.is_some()))
        .map(|frame| Ok::<_, Infallible>(Event::default().data(frame.unwrap_or_default())));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Map one batch event to its wire frames; `None` closes the stream.
fn frames_for(event: BatchEvent) -> Vec<Option<String>> {
    match event {
        BatchEvent::Started { .. } => vec![],
        BatchEvent::Item(outcome) => vec![Some(outcome.to_string())],
        BatchEvent::Fatal(message) => vec![Some(message), None],
        BatchEvent::Done => vec![None],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgstream_core::Outcome;

    #[test]
    fn item_events_become_single_frames() {
        let frames = frames_for(BatchEvent::Item(Outcome::Converted {
            name: "cat.png".into(),
            output_name: "cat-ab-0.webp".into(),
            initial_size: 100,
            compressed_size: 40,
        }));
        assert_eq!(
            frames,
            vec![Some(
                "Image: cat.png, Initial Size: 100 bytes, Compressed Size: 40 bytes".to_string()
            )]
        );
    }

    #[test]
    fn started_produces_no_frame() {
        assert!(frames_for(BatchEvent::Started { total: 7 }).is_empty());
    }

    #[test]
    fn done_closes_without_a_frame() {
        assert_eq!(frames_for(BatchEvent::Done), vec![None]);
    }

    #[test]
    fn fatal_sends_its_message_then_closes() {
        let frames = frames_for(BatchEvent::Fatal("Error reading source directory: x".into()));
        assert_eq!(
            frames,
            vec![Some("Error reading source directory: x".to_string()), None]
        );
    }
}
