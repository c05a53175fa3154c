//! Event bus for weave.
//!
//! Terminal input, timer ticks, websocket traffic and background-task results
//! are normalised into a single `AppEvent` enum and sent over a tokio unbounded
//! MPSC channel. The main loop receives from this channel and dispatches.
//!
//! Rendering is clock driven: the loop draws on every `Render`, never in
//! response to the event that changed state.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;
use weave_core::error::UploadError;
use weave_core::types::{Attachment, ChatSummary, ModelOption};
use weave_core::TransportEvent;

#[derive(Debug)]
pub enum AppEvent {
    /// A key press (`KeyEventKind::Press` only).
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// New size in (columns, rows).
    Resize(u16, u16),
    Tick,
    Render,
    /// Inbound websocket traffic.
    Transport(TransportEvent),
    /// Result of `GET /api/model/list`. Failures arrive as an empty list.
    ModelsLoaded(Vec<ModelOption>),
    /// Fresh rows for the chat list overlay.
    ChatsListed(Vec<ChatSummary>),
    UploadDone(Result<Vec<Attachment>, UploadError>),
    /// The merge editor finished; `result` replaces the content of `path`.
    MergeFinished { path: String, result: String },
    MergeCancelled,
}

pub type EventTx = mpsc::UnboundedSender<AppEvent>;

/// Frame cadence, roughly 30 FPS.
const RENDER_EVERY: Duration = Duration::from_millis(33);
/// Housekeeping cadence for toast expiry.
const TICK_EVERY: Duration = Duration::from_millis(250);

/// Creates the bus. Clone the sender for every producer.
pub fn channel() -> (EventTx, mpsc::UnboundedReceiver<AppEvent>) {
    mpsc::unbounded_channel()
}

fn translate(event: Event) -> Option<AppEvent> {
    match event {
        // Some terminals also report releases and repeats.
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        Event::Resize(cols, rows) => Some(AppEvent::Resize(cols, rows)),
        _ => None,
    }
}

/// Spawns the producer for terminal input and both timers.
///
/// Stops once the receiving side is gone.
pub fn spawn_event_task(tx: EventTx) {
    tokio::spawn(async move {
        let mut frames = interval(RENDER_EVERY);
        let mut ticks = interval(TICK_EVERY);
        let mut input = EventStream::new();

        loop {
            let next = tokio::select! {
                _ = frames.tick() => AppEvent::Render,
                _ = ticks.tick() => AppEvent::Tick,
                read = input.next().fuse() => match read {
                    Some(Ok(ev)) => match translate(ev) {
                        Some(app) => app,
                        None => continue,
                    },
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "terminal input error");
                        continue;
                    }
                    None => break,
                },
            };
            if tx.send(next).is_err() {
                break;
            }
        }
    });
}

/// Forwards websocket events from the transport channel onto the bus.
pub fn spawn_transport_forwarder(
    mut transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
    tx: EventTx,
) {
    tokio::spawn(async move {
        while let Some(event) = transport_rx.recv().await {
            if tx.send(AppEvent::Transport(event)).is_err() {
                break;
            }
        }
    });
}
