use serde::Deserialize;
use serde_json::json;

use crate::error::Result;

/// Events the host sends to the plugin. Anything not listed is `Unknown`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum InboundEvent {
    WillAppear(ActionEvent),
    WillDisappear(ActionEvent),
    KeyDown(ActionEvent),
    DidReceiveSettings(ActionEvent),
    DidReceiveGlobalSettings(GlobalSettingsEvent),
    PropertyInspectorDidAppear(PropertyInspectorEvent),
    #[serde(other)]
    Unknown,
}

impl InboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::WillAppear(_) => "willAppear",
            InboundEvent::WillDisappear(_) => "willDisappear",
            InboundEvent::KeyDown(_) => "keyDown",
            InboundEvent::DidReceiveSettings(_) => "didReceiveSettings",
            InboundEvent::DidReceiveGlobalSettings(_) => "didReceiveGlobalSettings",
            InboundEvent::PropertyInspectorDidAppear(_) => "propertyInspectorDidAppear",
            InboundEvent::Unknown => "unknown",
        }
    }
}

/// An event addressed to one key instance (`context`) of an action
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionEvent {
    pub action: String,
    pub context: String,
    #[serde(default)]
    pub payload: ActionPayload,
}

impl ActionEvent {
    pub fn settings(&self) -> &serde_json::Value {
        &self.payload.settings
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActionPayload {
    #[serde(default)]
    pub settings: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GlobalSettingsEvent {
    #[serde(default)]
    pub payload: ActionPayload,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyInspectorEvent {
    pub action: String,
    pub context: String,
}

pub fn decode_inbound(text: &str) -> Result<InboundEvent> {
    Ok(serde_json::from_str(text)?)
}

/// Messages the plugin sends to the host
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// First message on the socket; the event name comes from the launch arguments
    Register { event: String, uuid: String },
    SetTitle { context: String, title: String },
    GetGlobalSettings { context: String },
    SendToPropertyInspector {
        action: String,
        context: String,
        payload: serde_json::Value,
    },
    LogMessage { message: String },
}

impl OutboundMessage {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            OutboundMessage::Register { event, uuid } => json!({
                "event": event,
                "uuid": uuid,
            }),
            OutboundMessage::SetTitle { context, title } => json!({
                "event": "setTitle",
                "context": context,
                "payload": { "title": title, "target": 0 },
            }),
            OutboundMessage::GetGlobalSettings { context } => json!({
                "event": "getGlobalSettings",
                "context": context,
            }),
            OutboundMessage::SendToPropertyInspector {
                action,
                context,
                payload,
            } => json!({
                "event": "sendToPropertyInspector",
                "action": action,
                "context": context,
                "payload": payload,
            }),
            OutboundMessage::LogMessage { message } => json!({
                "event": "logMessage",
                "payload": { "message": message },
            }),
        }
    }
}
