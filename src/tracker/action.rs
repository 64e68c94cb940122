use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::reconciler::Reconciler;
use super::registry::{ButtonId, ButtonRegistry};
use super::scheduler::{PollScheduler, PollState};
use super::toggle::ToggleOutcome;
use crate::api::{Project, TrackingApi};
use crate::config::TrackingConfig;
use crate::deck::{ActionEvent, HostHandle, PropertyInspectorEvent};
use crate::plugin::ActionHandler;

pub const TRACKING_ACTION_UUID: &str = "net.progwise.timebook.tracking";

/// The start/stop tracking key.
///
/// Keeps the registry of visible keys and the poll timer in step: the timer
/// runs exactly while at least one key is visible.
pub struct TrackingAction {
    reconciler: Reconciler,
    scheduler: Mutex<PollScheduler>,
    host: HostHandle,
}

impl TrackingAction {
    pub fn new(
        api: Arc<dyn TrackingApi>,
        host: HostHandle,
        placeholder: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        let registry = Arc::new(Mutex::new(ButtonRegistry::new()));
        let reconciler = Reconciler::new(api, Arc::new(host.clone()), registry, placeholder);
        Self::with_reconciler(reconciler, host, poll_interval)
    }

    pub fn with_reconciler(reconciler: Reconciler, host: HostHandle, poll_interval: Duration) -> Self {
        Self {
            reconciler,
            scheduler: Mutex::new(PollScheduler::new(poll_interval)),
            host,
        }
    }

    pub async fn poll_state(&self) -> PollState {
        self.scheduler.lock().await.state()
    }

    /// Registers a key and starts polling if it is the first one.
    ///
    /// Returns the pending title lookup, if one was started.
    pub async fn button_appeared(&self, id: ButtonId, config: TrackingConfig) -> Option<JoinHandle<()>> {
        let lookup = needs_title_lookup(&config).then(|| config.task_id.clone());

        {
            let mut scheduler = self.scheduler.lock().await;
            let (became_active, visible) = {
                let mut registry = self.reconciler.registry().lock().await;
                (registry.register(id.clone(), config), registry.len())
            };
            tracing::debug!("Key {} registered ({} visible)", id, visible);
            if became_active {
                let reconciler = self.reconciler.clone();
                scheduler.start(move || {
                    let reconciler = reconciler.clone();
                    async move { reconciler.tick().await }
                });
                tracing::info!("First tracking key visible, polling every {:?}", scheduler.period());
            }
        }

        lookup.map(|task_id| self.spawn_title_lookup(id, task_id))
    }

    /// Removes a key and stops polling once none are left.
    pub async fn button_disappeared(&self, id: &ButtonId) {
        let mut scheduler = self.scheduler.lock().await;
        let became_empty = self.reconciler.registry().lock().await.unregister(id);
        if became_empty && scheduler.stop() {
            tracing::info!("No tracking keys visible, polling stopped");
        }
    }

    /// Applies new settings to a visible key.
    pub async fn settings_changed(&self, id: ButtonId, config: TrackingConfig) -> Option<JoinHandle<()>> {
        let registered = self.reconciler.registry().lock().await.get(&id).is_some();
        if !registered {
            tracing::debug!("Settings for invisible key {} ignored", id);
            return None;
        }
        self.button_appeared(id, config).await
    }

    /// Toggles tracking for a key. The registered settings win over the
    /// ones carried by the press event.
    pub async fn pressed(&self, id: &ButtonId, fallback: TrackingConfig) -> ToggleOutcome {
        let config = self
            .reconciler
            .registry()
            .lock()
            .await
            .get(id)
            .map(|button| button.config.clone())
            .unwrap_or(fallback);
        self.reconciler.toggle(id, &config).await
    }

    /// Pushes today's projects and tasks to the property inspector's task picker.
    pub async fn send_projects(&self, action: &str, context: &str) {
        let today = Local::now().date_naive();
        match self.reconciler.api().projects(today).await {
            Ok(projects) => {
                let payload = projects_payload(&projects);
                if let Err(e) = self.host.send_to_property_inspector(action, context, payload) {
                    tracing::warn!("Failed to send projects to inspector: {}", e);
                }
            }
            Err(e) => tracing::warn!("Could not load projects: {}", e),
        }
    }

    fn spawn_title_lookup(&self, id: ButtonId, task_id: String) -> JoinHandle<()> {
        let api = self.reconciler.api().clone();
        let registry = self.reconciler.registry().clone();
        tokio::spawn(async move {
            match api.task(&task_id).await {
                Ok(Some(task)) => {
                    if registry.lock().await.set_title(&id, &task_id, task.title) {
                        tracing::debug!("Resolved title for task {}", task_id);
                    }
                }
                Ok(None) => tracing::warn!("Task {} not found", task_id),
                Err(e) => tracing::warn!("Could not resolve title for task {}: {}", task_id, e),
            }
        })
    }
}

fn needs_title_lookup(config: &TrackingConfig) -> bool {
    config.is_configured() && config.task_title.as_deref().map_or(true, str::is_empty)
}

/// Datasource payload for the inspector's grouped task dropdown
fn projects_payload(projects: &[Project]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = projects
        .iter()
        .map(|project| {
            json!({
                "label": project.title,
                "children": project
                    .tasks
                    .iter()
                    .map(|task| json!({ "label": task.title, "value": task.id }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "event": "sendProjects", "items": items })
}

#[async_trait]
impl ActionHandler for TrackingAction {
    fn uuid(&self) -> &str {
        TRACKING_ACTION_UUID
    }

    async fn will_appear(&self, event: &ActionEvent) {
        let config = TrackingConfig::from_settings(event.settings());
        self.button_appeared(ButtonId::new(&event.context), config).await;
    }

    async fn will_disappear(&self, event: &ActionEvent) {
        self.button_disappeared(&ButtonId::new(&event.context)).await;
    }

    async fn key_down(&self, event: &ActionEvent) {
        let config = TrackingConfig::from_settings(event.settings());
        self.pressed(&ButtonId::new(&event.context), config).await;
    }

    async fn did_receive_settings(&self, event: &ActionEvent) {
        let config = TrackingConfig::from_settings(event.settings());
        self.settings_changed(ButtonId::new(&event.context), config).await;
    }

    async fn property_inspector_did_appear(&self, event: &PropertyInspectorEvent) {
        self.send_projects(&event.action, &event.context).await;
    }
}
