use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use super::protocol::{decode_inbound, InboundEvent, OutboundMessage};
use crate::error::{DeckError, Result};
use crate::tracker::{ButtonId, LabelSink};

/// Cloneable outbound side of the host connection
#[derive(Clone, Debug)]
pub struct HostHandle {
    tx: mpsc::UnboundedSender<OutboundMessage>,
    plugin_uuid: String,
}

impl HostHandle {
    pub fn new(tx: mpsc::UnboundedSender<OutboundMessage>, plugin_uuid: impl Into<String>) -> Self {
        Self {
            tx,
            plugin_uuid: plugin_uuid.into(),
        }
    }

    pub fn send(&self, message: OutboundMessage) -> Result<()> {
        self.tx.send(message).map_err(|_| DeckError::ChannelClosed)
    }

    pub fn set_title(&self, context: &str, title: &str) -> Result<()> {
        self.send(OutboundMessage::SetTitle {
            context: context.to_string(),
            title: title.to_string(),
        })
    }

    pub fn get_global_settings(&self) -> Result<()> {
        self.send(OutboundMessage::GetGlobalSettings {
            context: self.plugin_uuid.clone(),
        })
    }

    pub fn send_to_property_inspector(
        &self,
        action: &str,
        context: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.send(OutboundMessage::SendToPropertyInspector {
            action: action.to_string(),
            context: context.to_string(),
            payload,
        })
    }

    /// Writes a line into the host's own plugin log.
    pub fn log_message(&self, message: impl Into<String>) -> Result<()> {
        self.send(OutboundMessage::LogMessage {
            message: message.into(),
        })
    }
}

impl LabelSink for HostHandle {
    fn set_label(&self, id: &ButtonId, text: &str) -> Result<()> {
        self.set_title(id.as_str(), text)
    }
}

/// Connects to the host, registers the plugin and starts the reader and
/// writer tasks. The returned receiver ends when the socket closes.
pub async fn connect(
    port: u16,
    plugin_uuid: &str,
    register_event: &str,
) -> Result<(HostHandle, mpsc::UnboundedReceiver<InboundEvent>)> {
    let url = url::Url::parse(&format!("ws://127.0.0.1:{port}"))
        .map_err(|e| DeckError::Connection(format!("invalid host address: {e}")))?;

    let (ws_stream, _response) = connect_async(url.as_str())
        .await
        .map_err(|e| DeckError::Connection(e.to_string()))?;
    tracing::info!("Connected to Stream Deck on port {}", port);

    let (mut write, mut read) = ws_stream.split();

    let register = OutboundMessage::Register {
        event: register_event.to_string(),
        uuid: plugin_uuid.to_string(),
    };
    write
        .send(WsMessage::Text(register.to_json().to_string().into()))
        .await
        .map_err(|e| DeckError::Connection(format!("registration failed: {e}")))?;

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<InboundEvent>();

    tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            let text = message.to_json().to_string();
            if let Err(e) = write.send(WsMessage::Text(text.into())).await {
                tracing::warn!("Failed to write to Stream Deck: {}", e);
                break;
            }
        }
        tracing::debug!("Host writer stopped");
    });

    tokio::spawn(async move {
        while let Some(msg_result) = read.next().await {
            match msg_result {
                Ok(WsMessage::Text(text)) => match decode_inbound(text.as_str()) {
                    Ok(event) => {
                        tracing::trace!("Host event: {}", event.name());
                        if in_tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Skipping host message: {}", e);
                    }
                },
                Ok(WsMessage::Close(frame)) => {
                    tracing::info!("Stream Deck closed the connection: {:?}", frame);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Stream Deck connection error: {}", e);
                    break;
                }
            }
        }
    });

    Ok((HostHandle::new(out_tx, plugin_uuid), in_rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_label_sends_set_title() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = HostHandle::new(tx, "plugin-1");

        handle.set_label(&ButtonId::new("ctx-9"), "Not\ntracking").unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            OutboundMessage::SetTitle {
                context: "ctx-9".to_string(),
                title: "Not\ntracking".to_string(),
            }
        );
    }

    #[test]
    fn test_global_settings_uses_plugin_uuid() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = HostHandle::new(tx, "plugin-1");

        handle.get_global_settings().unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            OutboundMessage::GetGlobalSettings {
                context: "plugin-1".to_string(),
            }
        );
    }

    #[test]
    fn test_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let handle = HostHandle::new(tx, "plugin-1");
        let err = handle.log_message("hello").unwrap_err();
        assert!(matches!(err, DeckError::ChannelClosed));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Port 1 is never a Stream Deck server
        let result = connect(1, "uuid", "registerPlugin").await;
        assert!(matches!(result, Err(DeckError::Connection(_))));
    }
}
