//! Test doubles for the remote API and the label surface

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use super::reconciler::LabelSink;
use super::registry::ButtonId;
use crate::api::{CurrentTracking, Project, RemoteError, StoppedTracking, Task, TrackingApi};
use crate::error::{DeckError, Result};

/// Fixed clock used by reconciler tests
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub current: Option<CurrentTracking>,
    pub fail_current: bool,
    pub fail_mutations: bool,
    pub titles: HashMap<String, String>,
    pub projects: Vec<Project>,
    pub current_calls: usize,
    pub starts: Vec<String>,
    pub stops: usize,
}

/// In-memory Timebook: one active entry, start replaces it, stop clears it
#[derive(Debug, Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn tracking(task_id: &str, seconds_ago: i64) -> Arc<Self> {
        let api = Self::new();
        api.set_current(Some(CurrentTracking::new(
            fixed_now() - chrono::Duration::seconds(seconds_ago),
            task_id,
        )));
        api
    }

    pub fn set_current(&self, current: Option<CurrentTracking>) {
        self.state.lock().unwrap().current = current;
    }

    pub fn set_fail_current(&self, fail: bool) {
        self.state.lock().unwrap().fail_current = fail;
    }

    pub fn set_fail_mutations(&self, fail: bool) {
        self.state.lock().unwrap().fail_mutations = fail;
    }

    pub fn with_title(self: Arc<Self>, task_id: &str, title: &str) -> Arc<Self> {
        self.state
            .lock()
            .unwrap()
            .titles
            .insert(task_id.to_string(), title.to_string());
        self
    }

    pub fn starts(&self) -> Vec<String> {
        self.state.lock().unwrap().starts.clone()
    }

    pub fn stops(&self) -> usize {
        self.state.lock().unwrap().stops
    }

    pub fn current_calls(&self) -> usize {
        self.state.lock().unwrap().current_calls
    }
}

#[async_trait]
impl TrackingApi for FakeApi {
    async fn current_tracking(&self) -> std::result::Result<Option<CurrentTracking>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.current_calls += 1;
        if state.fail_current {
            return Err(RemoteError::new("currentTracking", "connection refused"));
        }
        Ok(state.current.clone())
    }

    async fn task(&self, task_id: &str) -> std::result::Result<Option<Task>, RemoteError> {
        let state = self.state.lock().unwrap();
        Ok(state.titles.get(task_id).map(|title| Task {
            id: task_id.to_string(),
            title: title.clone(),
        }))
    }

    async fn tracking_start(&self, task_id: &str) -> std::result::Result<CurrentTracking, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.starts.push(task_id.to_string());
        if state.fail_mutations {
            return Err(RemoteError::new("trackingStart", "server error"));
        }
        let tracking = CurrentTracking::new(fixed_now(), task_id);
        state.current = Some(tracking.clone());
        Ok(tracking)
    }

    async fn tracking_stop(&self) -> std::result::Result<Option<StoppedTracking>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.stops += 1;
        if state.fail_mutations {
            return Err(RemoteError::new("trackingStop", "server error"));
        }
        Ok(state.current.take().map(|t| StoppedTracking { task_id: t.task_id }))
    }

    async fn projects(&self, _from: NaiveDate) -> std::result::Result<Vec<Project>, RemoteError> {
        Ok(self.state.lock().unwrap().projects.clone())
    }
}

/// Records every label write; keys listed in `broken` fail
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<(ButtonId, String)>>,
    broken: Mutex<Vec<ButtonId>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn break_key(&self, id: &str) {
        self.broken.lock().unwrap().push(ButtonId::new(id));
    }

    pub fn calls(&self) -> Vec<(ButtonId, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Latest label per key
    pub fn labels(&self) -> HashMap<String, String> {
        self.calls()
            .into_iter()
            .map(|(id, text)| (id.as_str().to_string(), text))
            .collect()
    }

    pub fn label(&self, id: &str) -> Option<String> {
        self.labels().get(id).cloned()
    }
}

impl LabelSink for RecordingSink {
    fn set_label(&self, id: &ButtonId, text: &str) -> Result<()> {
        if self.broken.lock().unwrap().contains(id) {
            return Err(DeckError::ChannelClosed);
        }
        self.calls.lock().unwrap().push((id.clone(), text.to_string()));
        Ok(())
    }
}
