//! Routes host events to the registered actions

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::api::GraphqlTrackingClient;
use crate::cli::Cli;
use crate::config::{Credential, GlobalSettings, PluginConfig};
use crate::deck::{self, ActionEvent, InboundEvent, PropertyInspectorEvent};
use crate::error::{DeckError, Result};
use crate::tracker::TrackingAction;

/// Lifecycle callbacks of one plugin action. Every callback defaults to a no-op.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Action UUID from the plugin manifest
    fn uuid(&self) -> &str;

    async fn will_appear(&self, _event: &ActionEvent) {}

    async fn will_disappear(&self, _event: &ActionEvent) {}

    async fn key_down(&self, _event: &ActionEvent) {}

    async fn did_receive_settings(&self, _event: &ActionEvent) {}

    async fn property_inspector_did_appear(&self, _event: &PropertyInspectorEvent) {}
}

pub struct Plugin {
    actions: HashMap<String, Arc<dyn ActionHandler>>,
    credential: Credential,
}

impl Plugin {
    pub fn new(credential: Credential) -> Self {
        Self {
            actions: HashMap::new(),
            credential,
        }
    }

    pub fn register_action(&mut self, action: Arc<dyn ActionHandler>) {
        self.actions.insert(action.uuid().to_string(), action);
    }

    fn handler(&self, uuid: &str) -> Option<Arc<dyn ActionHandler>> {
        let handler = self.actions.get(uuid).cloned();
        if handler.is_none() {
            tracing::debug!("No handler for action {}", uuid);
        }
        handler
    }

    /// Handles one event. Appear, disappear and settings run inline so
    /// their order is kept; presses and inspector requests are spawned.
    pub async fn dispatch(&self, event: InboundEvent) {
        match event {
            InboundEvent::WillAppear(ev) => {
                if let Some(handler) = self.handler(&ev.action) {
                    handler.will_appear(&ev).await;
                }
            }
            InboundEvent::WillDisappear(ev) => {
                if let Some(handler) = self.handler(&ev.action) {
                    handler.will_disappear(&ev).await;
                }
            }
            InboundEvent::DidReceiveSettings(ev) => {
                if let Some(handler) = self.handler(&ev.action) {
                    handler.did_receive_settings(&ev).await;
                }
            }
            InboundEvent::KeyDown(ev) => {
                if let Some(handler) = self.handler(&ev.action) {
                    tokio::spawn(async move {
                        handler.key_down(&ev).await;
                    });
                }
            }
            InboundEvent::PropertyInspectorDidAppear(ev) => {
                if let Some(handler) = self.handler(&ev.action) {
                    tokio::spawn(async move {
                        handler.property_inspector_did_appear(&ev).await;
                    });
                }
            }
            InboundEvent::DidReceiveGlobalSettings(ev) => {
                let settings = GlobalSettings::from_settings(&ev.payload.settings);
                if let Some(token) = settings.access_token {
                    self.credential.set(Some(&token));
                    tracing::info!(
                        "Global settings received, access token {}",
                        if self.credential.is_set() { "set" } else { "cleared" }
                    );
                }
            }
            InboundEvent::Unknown => {}
        }
    }

    /// Dispatches events until the host connection closes.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<InboundEvent>) {
        while let Some(event) = events.recv().await {
            self.dispatch(event).await;
        }
    }
}

/// Connects to the host and serves events until it disconnects or the
/// process is interrupted.
pub async fn serve(cli: &Cli, config: &PluginConfig) -> Result<()> {
    let credential = Credential::from_raw(cli.access_token.as_deref());
    let api = GraphqlTrackingClient::new(config, credential.clone())
        .map_err(|e| DeckError::Config(e.to_string()))?;

    let (host, events) = deck::connect(cli.port, &cli.plugin_uuid, &cli.register_event).await?;
    host.get_global_settings()?;
    host.log_message(format!("timebook-deck {} connected", env!("CARGO_PKG_VERSION")))?;

    let action = TrackingAction::new(
        Arc::new(api),
        host.clone(),
        config.labels.placeholder.clone(),
        config.poll_interval(),
    );

    let mut plugin = Plugin::new(credential);
    plugin.register_action(Arc::new(action));

    tokio::select! {
        _ = plugin.run(events) => tracing::info!("Stream Deck disconnected, shutting down"),
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted, shutting down"),
    }
    Ok(())
}
