//! Streaming transport between the session controller and the chat backend.
//!
//! The controller only sees the [`Transport`] trait: hand over a request,
//! or drop the connection. Replies flow back asynchronously as
//! [`TransportEvent`]s on a channel the owner drains in its event loop.

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::error::TransportError;
use crate::types::{ChatRequest, Fragment};

/// Something that can carry a [`ChatRequest`] to the backend.
pub trait Transport {
    /// Queues `request` for sending. Replies arrive later as events.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the request cannot be encoded or no
    /// connection can be started.
    fn send_message(&mut self, request: &ChatRequest) -> Result<(), TransportError>;

    /// Drops the live connection, abandoning any reply in flight.
    fn disconnect(&mut self);
}

/// Inbound traffic, as seen by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Fragment { message: Fragment, is_final: bool },
    Error(String),
    /// The socket closed without an error frame.
    Closed,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ServerFrame {
    Message {
        message: Fragment,
        #[serde(rename = "isFinal", default)]
        is_final: bool,
    },
    Error {
        error: String,
    },
}

/// Decodes one text frame. Unknown or malformed frames yield `None`.
pub fn decode_frame(text: &str) -> Option<TransportEvent> {
    match serde_json::from_str::<ServerFrame>(text) {
        Ok(ServerFrame::Message { message, is_final }) => {
            Some(TransportEvent::Fragment { message, is_final })
        }
        Ok(ServerFrame::Error { error }) => Some(TransportEvent::Error(error)),
        Err(e) => {
            tracing::warn!(error = %e, "skipping unparseable server frame");
            None
        }
    }
}

/// Websocket transport backed by `tokio-tungstenite`.
///
/// The socket is opened lazily by the first send and reused afterwards. Each
/// connection runs in its own task; [`Transport::disconnect`] aborts it and
/// the next send opens a fresh one.
#[derive(Debug)]
pub struct WsTransport {
    url: String,
    events: mpsc::UnboundedSender<TransportEvent>,
    outbound: Option<mpsc::UnboundedSender<String>>,
    task: Option<JoinHandle<()>>,
}

impl WsTransport {
    pub fn new(url: impl Into<String>, events: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self {
            url: url.into(),
            events,
            outbound: None,
            task: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn connection(&mut self) -> Result<&mpsc::UnboundedSender<String>, TransportError> {
        let alive = self.outbound.as_ref().is_some_and(|tx| !tx.is_closed());
        if !alive {
            let handle = tokio::runtime::Handle::try_current()
                .map_err(|e| TransportError::Socket(e.to_string()))?;
            let (tx, rx) = mpsc::unbounded_channel();
            let url = self.url.clone();
            let events = self.events.clone();
            self.task = Some(handle.spawn(run_socket(url, rx, events)));
            self.outbound = Some(tx);
        }
        self.outbound.as_ref().ok_or(TransportError::Closed)
    }
}

impl Transport for WsTransport {
    fn send_message(&mut self, request: &ChatRequest) -> Result<(), TransportError> {
        let payload = serde_json::to_string(request)?;
        self.connection()?
            .send(payload)
            .map_err(|_| TransportError::Closed)
    }

    fn disconnect(&mut self) {
        self.outbound = None;
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!(url = %self.url, "websocket disconnected");
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Owns one websocket connection until either side closes it.
async fn run_socket(
    url: String,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            tracing::error!(%url, error = %e, "websocket connect failed");
            let _ = events.send(TransportEvent::Error(e.to_string()));
            return;
        }
    };
    tracing::info!(%url, "websocket connected");
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            out = outbound.recv() => {
                let Some(text) = out else {
                    let _ = write.close().await;
                    break;
                };
                if let Err(e) = write.send(WsMessage::Text(text)).await {
                    tracing::error!(error = %e, "websocket send failed");
                    let _ = events.send(TransportEvent::Error(e.to_string()));
                    break;
                }
            }
            frame = read.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    if let Some(event) = decode_frame(&text) {
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    tracing::debug!("websocket closed by server");
                    let _ = events.send(TransportEvent::Closed);
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::error!(error = %e, "websocket receive failed");
                    let _ = events.send(TransportEvent::Error(e.to_string()));
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn decodes_message_frame() {
        let raw = r#"{"type":"message","message":{"id":"a1","role":"assistant","content":"hi"},"isFinal":true}"#;
        let event = decode_frame(raw).unwrap();
        assert_eq!(
            event,
            TransportEvent::Fragment {
                message: Fragment {
                    id: Some("a1".into()),
                    role: Some(Role::Assistant),
                    content: Some("hi".into()),
                },
                is_final: true,
            }
        );
    }

    #[test]
    fn is_final_defaults_to_false() {
        let raw = r#"{"type":"message","message":{"content":"par"}}"#;
        assert!(matches!(
            decode_frame(raw),
            Some(TransportEvent::Fragment { is_final: false, .. })
        ));
    }

    #[test]
    fn decodes_error_frame() {
        let raw = r#"{"type":"error","error":"Quota not enough"}"#;
        assert_eq!(
            decode_frame(raw),
            Some(TransportEvent::Error("Quota not enough".into()))
        );
    }

    #[test]
    fn garbage_is_skipped() {
        assert_eq!(decode_frame("not json"), None);
        assert_eq!(decode_frame(r#"{"type":"ping"}"#), None);
    }

    #[tokio::test]
    async fn unreachable_server_reports_error_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut transport = WsTransport::new("ws://127.0.0.1:9/api/chat/ws", tx);
        let request = ChatRequest {
            messages: Vec::new(),
            model: "m".into(),
            mode: crate::types::ChatMode::Chat,
            other_config: Default::default(),
            tools: None,
        };
        transport.send_message(&request).unwrap();
        assert!(matches!(rx.recv().await, Some(TransportEvent::Error(_))));
        transport.disconnect();
    }
}
