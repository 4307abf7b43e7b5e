//! WebSocket push channel.

use futures::StreamExt;
use serde::Deserialize;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::{FrameStream, PushFrame, PushTransport, TransportError};
use crate::api::UserId;

/// Push channel over a WebSocket. The connection is read-only; the client
/// never sends application frames.
pub struct WsTransport {
    url: String,
}

#[derive(Deserialize)]
struct WireFrame {
    #[allow(dead_code)]
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    user_id: Option<UserId>,
}

impl WsTransport {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

impl PushTransport for WsTransport {
    async fn connect(&mut self) -> Result<FrameStream, TransportError> {
        let (stream, _) = connect_async(&self.url).await?;
        let frames = stream.filter_map(|message| async {
            match message {
                Ok(Message::Text(text)) => Some(Ok(parse_frame(&text))),
                // Pings and pongs are handled by the protocol layer; a
                // server-initiated close ends the stream.
                Ok(Message::Close(_)) => None,
                Ok(_) => None,
                Err(e) => Some(Err(TransportError::from(e))),
            }
        });
        Ok(frames.boxed())
    }
}

/// Parse a notification frame. Malformed payloads degrade to a frame without
/// a focus hint; the refresh still happens, only the hint is lost.
fn parse_frame(text: &str) -> PushFrame {
    match serde_json::from_str::<WireFrame>(text) {
        Ok(frame) => PushFrame {
            user_id: frame.user_id,
        },
        Err(e) => {
            tracing::warn!("malformed push frame: {}", e);
            PushFrame { user_id: None }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_with_user_id_carries_hint() {
        let frame = parse_frame(r#"{"event": "message", "user_id": 42}"#);
        assert_eq!(frame.user_id, Some(42));
    }

    #[test]
    fn frame_without_user_id_has_no_hint() {
        let frame = parse_frame(r#"{"event": "threads_changed"}"#);
        assert_eq!(frame.user_id, None);
    }

    #[test]
    fn malformed_frame_degrades_to_plain_refresh() {
        assert_eq!(parse_frame("not json").user_id, None);
        assert_eq!(parse_frame("").user_id, None);
        assert_eq!(parse_frame(r#"{"user_id": "not-a-number"}"#).user_id, None);
    }
}
