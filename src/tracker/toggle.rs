use super::reconciler::Reconciler;
use super::registry::ButtonId;
use crate::api::RemoteError;
use crate::config::TrackingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started,
    Stopped,
    /// Key has no task; nothing was sent
    Unconfigured,
    /// A remote call failed; logged and swallowed
    Failed,
}

impl Reconciler {
    /// Handles a key press: stop if this key's task is the active one,
    /// start it otherwise. Always ends with one reconciliation pass.
    pub async fn toggle(&self, id: &ButtonId, config: &TrackingConfig) -> ToggleOutcome {
        let outcome = if !config.is_configured() {
            tracing::info!("Key {} has no task configured", id);
            ToggleOutcome::Unconfigured
        } else {
            match self.switch_tracking(id, &config.task_id).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!("Toggle on key {} failed: {}", id, e);
                    ToggleOutcome::Failed
                }
            }
        };

        if let Err(e) = self.reconcile().await {
            tracing::warn!("Refresh after toggle failed: {}", e);
        }
        outcome
    }

    async fn switch_tracking(
        &self,
        id: &ButtonId,
        task_id: &str,
    ) -> Result<ToggleOutcome, RemoteError> {
        let current = self.api().current_tracking().await?;

        if current.as_ref().is_some_and(|active| active.is_for(task_id)) {
            match self.api().tracking_stop().await? {
                Some(stopped) => tracing::info!("Stopped tracking task {}", stopped.task_id),
                None => tracing::info!("Task {} was no longer tracked", task_id),
            }
            if let Err(e) = self.sink().set_label(id, self.placeholder()) {
                tracing::warn!("Failed to label key {}: {}", id, e);
            }
            Ok(ToggleOutcome::Stopped)
        } else {
            let started = self.api().tracking_start(task_id).await?;
            tracing::info!("Started tracking task {} at {}", started.task_id, started.start);
            Ok(ToggleOutcome::Started)
        }
    }
}
