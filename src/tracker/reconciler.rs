use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::registry::{ButtonId, ButtonRegistry, RegisteredButton};
use crate::api::{CurrentTracking, RemoteError, TrackingApi};
use crate::duration::format_elapsed;
use crate::error::Result;

/// Where key labels go. The host connection in production.
pub trait LabelSink: Send + Sync {
    fn set_label(&self, id: &ButtonId, text: &str) -> Result<()>;
}

/// Brings every registered key's label in line with the one active
/// tracking entry. One remote read per pass, however many keys are visible.
#[derive(Clone)]
pub struct Reconciler {
    api: Arc<dyn TrackingApi>,
    sink: Arc<dyn LabelSink>,
    registry: Arc<Mutex<ButtonRegistry>>,
    placeholder: Arc<str>,
    clock: fn() -> DateTime<Utc>,
}

impl Reconciler {
    pub fn new(
        api: Arc<dyn TrackingApi>,
        sink: Arc<dyn LabelSink>,
        registry: Arc<Mutex<ButtonRegistry>>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            api,
            sink,
            registry,
            placeholder: Arc::from(placeholder.into()),
            clock: Utc::now,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn api(&self) -> &Arc<dyn TrackingApi> {
        &self.api
    }

    pub fn sink(&self) -> &Arc<dyn LabelSink> {
        &self.sink
    }

    pub fn registry(&self) -> &Arc<Mutex<ButtonRegistry>> {
        &self.registry
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Fetches the active entry once and relabels every key.
    ///
    /// On a failed fetch no label is touched. Returns the number of keys labelled.
    pub async fn reconcile(&self) -> std::result::Result<usize, RemoteError> {
        let tracking = self.api.current_tracking().await?;
        let now = (self.clock)();
        Ok(self.render_all(tracking.as_ref(), now).await)
    }

    /// One scheduled tick. Failures only skip this tick.
    pub async fn tick(&self) {
        match self.reconcile().await {
            Ok(count) => tracing::trace!("Tick labelled {} key(s)", count),
            Err(e) => tracing::debug!("Tick skipped: {}", e),
        }
    }

    async fn render_all(&self, tracking: Option<&CurrentTracking>, now: DateTime<Utc>) -> usize {
        let buttons = self.registry.lock().await.snapshot();

        let mut labelled = 0;
        for button in &buttons {
            let label = render_label(button, tracking, now, &self.placeholder);
            match self.sink.set_label(&button.id, &label) {
                Ok(()) => labelled += 1,
                Err(e) => tracing::warn!("Failed to label key {}: {}", button.id, e),
            }
        }
        labelled
    }
}

/// Label for one key: title and elapsed time when its task is the active
/// one, the placeholder otherwise.
pub fn render_label(
    button: &RegisteredButton,
    tracking: Option<&CurrentTracking>,
    now: DateTime<Utc>,
    placeholder: &str,
) -> String {
    match tracking {
        Some(active) if active.is_for(&button.config.task_id) => {
            format!("{}\n{}", button.title, format_elapsed(active.elapsed_secs(now)))
        }
        _ => placeholder.to_string(),
    }
}
