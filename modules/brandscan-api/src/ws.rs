//! The Event Stream Gateway's WebSocket handler. One socket subscribes to at
//! most one scan: the first parseable `start_scan` message spawns a `Scan`
//! as a background task and the connection becomes a one-way event feed
//! (plus a disconnect watcher) until the scan reaches a terminal event or
//! the client goes away. Task-split three ways — downstream sender,
//! upstream receiver, scan worker — composed with `tokio::select!` so
//! whichever finishes first tears down the other two.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use brandscan_common::model::{ScanMode, ScanRequest};
use brandscan_common::ScanEvent;
use brandscan_orchestrator::Scan;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::state::AppState;

/// Beyond this many buffered events a slow client starts seeing the
/// drop/coalesce policy kick in rather than an ever-growing queue.
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InboundMessage {
    StartScan {
        url: String,
        mode: ScanMode,
        #[serde(default)]
        preferred_lang: Option<String>,
    },
    Disconnect,
}

pub async fn scan_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sender, mut receiver) = socket.split();

    let Some(request) = await_start_scan(&mut receiver).await else {
        return;
    };
    info!(scan_id = %request.scan_id, mode = ?request.mode, "scan started over websocket");

    let (events_tx, events_rx) = mpsc::channel::<ScanEvent>(EVENT_CHANNEL_CAPACITY);
    let scan = Scan::new(request, Arc::clone(&state.config), Arc::clone(&state.services), Arc::clone(&state.screenshots), events_tx);
    let mut scan_task = tokio::spawn(scan.run());

    let mut downstream_task = tokio::spawn(downstream_loop(sender, events_rx));
    let mut upstream_task = tokio::spawn(upstream_loop(receiver));

    tokio::select! {
        _ = &mut downstream_task => {
            upstream_task.abort();
        }
        _ = &mut upstream_task => {
            downstream_task.abort();
        }
    }

    scan_task.abort();
    match scan_task.await {
        Ok(Ok(outcome)) => info!(scan_id = %outcome.scan_id, pages = outcome.pages_analyzed, keys = outcome.keys_completed, "scan finished"),
        Ok(Err(e)) => warn!(error = %e, "scan ended with an error"),
        Err(_) => {} // aborted after the stream already closed, not a real failure
    }
}

/// Reads inbound messages until a `start_scan` arrives, the client sends
/// `disconnect`, or the socket closes — whichever comes first.
async fn await_start_scan(receiver: &mut SplitStream<WebSocket>) -> Option<ScanRequest> {
    loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<InboundMessage>(&text) {
                Ok(InboundMessage::StartScan { url, mode, preferred_lang }) => {
                    return Some(ScanRequest::new(url, mode, preferred_lang));
                }
                Ok(InboundMessage::Disconnect) => return None,
                Err(e) => warn!(error = %e, "ignoring unparseable inbound message"),
            },
            Some(Ok(Message::Close(_))) | None => return None,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!(error = %e, "websocket receive error while awaiting start_scan");
                return None;
            }
        }
    }
}

/// Watches for the client disconnecting or going silent; has no other job,
/// since the socket is effectively one-directional once a scan is running.
async fn upstream_loop(mut receiver: SplitStream<WebSocket>) {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(_) => break,
        }
    }
}

/// Forwards `ScanEvent`s to the client, applying the Gateway's backpressure
/// policy whenever the channel has backed up: `activity` events are dropped,
/// consecutive `status` events are coalesced to the latest, and
/// `discovery_result`/`key_result`/`summary`/`complete`/`error` are always
/// delivered.
async fn downstream_loop(mut sender: SplitSink<WebSocket, Message>, mut events_rx: mpsc::Receiver<ScanEvent>) {
    while let Some(first) = events_rx.recv().await {
        for event in drain_with_backpressure(first, &mut events_rx) {
            let terminal = event.is_terminal();
            let Ok(json) = serde_json::to_string(&event) else { continue };
            if sender.send(Message::Text(json.into())).await.is_err() {
                return;
            }
            if terminal {
                return;
            }
        }
    }
}

fn drain_with_backpressure(first: ScanEvent, events_rx: &mut mpsc::Receiver<ScanEvent>) -> Vec<ScanEvent> {
    let mut pending = vec![first];
    while let Ok(next) = events_rx.try_recv() {
        let coalesces_with_last = pending.last().is_some_and(|last| last.is_coalescible()) && next.is_coalescible();
        if coalesces_with_last {
            *pending.last_mut().expect("checked above") = next;
        } else if next.is_droppable() {
            // Something else is already queued behind this progress note;
            // the client only needs the freshest state, not every step.
            continue;
        } else {
            pending.push(next);
        }
    }
    pending
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(progress: u8) -> ScanEvent {
        ScanEvent::Status { message: "working".into(), phase: brandscan_common::ScanPhase::Discovery, progress }
    }

    fn activity() -> ScanEvent {
        ScanEvent::Activity { message: "fetching".into(), timestamp: chrono::Utc::now() }
    }

    #[tokio::test]
    async fn coalesces_consecutive_status_events_to_the_latest() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(status(10)).await.unwrap();
        tx.send(status(20)).await.unwrap();
        tx.send(status(30)).await.unwrap();
        let first = rx.recv().await.unwrap();
        let drained = drain_with_backpressure(first, &mut rx);
        assert_eq!(drained.len(), 1);
        assert!(matches!(drained[0], ScanEvent::Status { progress: 30, .. }));
    }

    #[tokio::test]
    async fn drops_queued_activity_events_under_backpressure() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(activity()).await.unwrap();
        tx.send(activity()).await.unwrap();
        tx.send(ScanEvent::Summary { text: "done".into() }).await.unwrap();
        let first = rx.recv().await.unwrap();
        let drained = drain_with_backpressure(first, &mut rx);
        assert_eq!(drained.len(), 1);
        assert!(matches!(drained[0], ScanEvent::Summary { .. }));
    }

    #[tokio::test]
    async fn never_drops_terminal_or_result_events() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(ScanEvent::Error { message: "boom".into() }).await.unwrap();
        tx.send(ScanEvent::Complete { message: "done".into(), timestamp: chrono::Utc::now() }).await.unwrap();
        let first = rx.recv().await.unwrap();
        let drained = drain_with_backpressure(first, &mut rx);
        assert_eq!(drained.len(), 2);
    }
}
