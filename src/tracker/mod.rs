//! Keeps visible tracking keys in step with the active Timebook entry

mod action;
mod reconciler;
mod registry;
mod scheduler;
mod toggle;

#[cfg(test)]
pub(crate) mod test_support;

pub use action::{TrackingAction, TRACKING_ACTION_UUID};
pub use reconciler::LabelSink;
pub use registry::ButtonId;
