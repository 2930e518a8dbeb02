use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use futures::stream::{self, Stream};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::{convert::Infallible, sync::Arc};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::api::AppState;
use crate::constants::intervals::SSE_KEEP_ALIVE;
use crate::constants::limits::WS_OUTBOUND_BUFFER;
use crate::models::Platform;
use crate::services::QueryIntent;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum HubEvent {
    ChatAnswered {
        intent: QueryIntent,
        sources: usize,
    },
    MediaGenerated {
        files: Vec<String>,
    },
    FileSynthesized {
        filename: String,
    },
    DownloadAnalyzed {
        platform: Platform,
        media_id: String,
    },
    Echo {
        message: String,
    },
}

/// Process-wide broadcast handle. Created once and owned by `SharedState`.
#[derive(Clone, Debug)]
pub struct MessagingHub {
    sender: broadcast::Sender<HubEvent>,
}

impl MessagingHub {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of subscribers that saw the event.
    pub fn publish(&self, event: HubEvent) -> usize {
        // No subscribers is the common case and not an error.
        self.sender.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.sender.subscribe()
    }

    pub fn echo(&self, message: impl Into<String>) -> HubEvent {
        let event = HubEvent::Echo {
            message: message.into(),
        };
        self.publish(event.clone());
        event
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(sse_handler))
        .route("/ws", get(ws_handler))
}

async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.hub().subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            Ok(event) => {
                let json = serde_json::to_string(&event).unwrap_or_default();
                Some((Ok(Event::default().data(json)), rx))
            }
            Err(broadcast::error::RecvError::Lagged(count)) => {
                warn!("Client lagged by {} messages", count);

                Some((
                    Ok(Event::default().event("warning").data("Missed some events")),
                    rx,
                ))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(SSE_KEEP_ALIVE))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let hub = state.hub().clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Answers every text frame with an `Echo` event until the peer closes.
async fn handle_socket(socket: WebSocket, hub: MessagingHub) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    info!(conn_id = %conn_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(WS_OUTBOUND_BUFFER);

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let event = hub.echo(text.as_str());
                let json = serde_json::to_string(&event).unwrap_or_default();
                if tx.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Closing the channel lets the sender flush queued echoes and exit.
    drop(tx);
    let _ = send_task.await;
    info!(conn_id = %conn_id, "WebSocket disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_value(HubEvent::Echo {
            message: "hi".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"type": "Echo", "payload": {"message": "hi"}}));
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let hub = MessagingHub::new(8);
        assert_eq!(hub.publish(HubEvent::Echo { message: "nobody".to_string() }), 0);

        let mut rx = hub.subscribe();
        let event = hub.echo("ping");
        assert!(matches!(event, HubEvent::Echo { ref message } if message == "ping"));

        match rx.recv().await.unwrap() {
            HubEvent::Echo { message } => assert_eq!(message, "ping"),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
