use serde::Deserialize;

/// Per-key settings as stored by the host (`{ "taskID", "taskTitle" }`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    #[serde(rename = "taskID")]
    pub task_id: String,
    #[serde(rename = "taskTitle")]
    pub task_title: Option<String>,
}

impl TrackingConfig {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            task_title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.task_title = Some(title.into());
        self
    }

    /// Decodes host settings; anything unreadable counts as unconfigured.
    pub fn from_settings(settings: &serde_json::Value) -> Self {
        match serde_json::from_value(settings.clone()) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Ignoring unreadable key settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.task_id.is_empty()
    }

    /// Title to show before the remote lookup has answered.
    pub fn provisional_title(&self) -> String {
        self.task_title
            .as_ref()
            .filter(|t| !t.is_empty())
            .cloned()
            .unwrap_or_else(|| self.task_id.clone())
    }
}

/// Plugin-wide settings shared across all keys
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
}

impl GlobalSettings {
    pub fn from_settings(settings: &serde_json::Value) -> Self {
        serde_json::from_value(settings.clone()).unwrap_or_default()
    }
}
