use std::collections::HashMap;
use std::fmt;

use crate::config::TrackingConfig;

/// Host-assigned identity of one visible key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ButtonId(String);

impl ButtonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredButton {
    pub id: ButtonId,
    pub config: TrackingConfig,
    /// First line of the label while this key's task is tracked
    pub title: String,
}

/// Visible keys of the tracking action, keyed by button identity
#[derive(Debug, Default)]
pub struct ButtonRegistry {
    buttons: HashMap<ButtonId, RegisteredButton>,
}

impl ButtonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a key. Returns true when the registry was empty before.
    pub fn register(&mut self, id: ButtonId, config: TrackingConfig) -> bool {
        let was_empty = self.buttons.is_empty();
        let title = config.provisional_title();
        self.buttons.insert(id.clone(), RegisteredButton { id, config, title });
        was_empty
    }

    /// Removes a key. Returns true when this emptied the registry.
    pub fn unregister(&mut self, id: &ButtonId) -> bool {
        self.buttons.remove(id).is_some() && self.is_empty()
    }

    /// Sets a resolved title, but only if the key still shows `task_id`.
    pub fn set_title(&mut self, id: &ButtonId, task_id: &str, title: impl Into<String>) -> bool {
        match self.buttons.get_mut(id) {
            Some(button) if button.config.task_id == task_id => {
                button.title = title.into();
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: &ButtonId) -> Option<&RegisteredButton> {
        self.buttons.get(id)
    }

    pub fn snapshot(&self) -> Vec<RegisteredButton> {
        self.buttons.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}
