// manifestrs/src/orchestrator/events.rs

use crate::config::RemovedFilePolicy;
use crate::orchestrator::summary::{GenerationMode, GenerationSummary};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};

/// Lifecycle notifications of a generation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum GenerationEvent {
    #[serde(rename = "generation:start", rename_all = "camelCase")]
    Start {
        #[serde(rename = "type")]
        mode: GenerationMode,
        total_components: usize,
    },

    #[serde(rename = "generation:progress", rename_all = "camelCase")]
    Progress {
        current: usize,
        total: usize,
        component_id: String,
        component_name: String,
    },

    #[serde(rename = "generation:complete")]
    Complete { summary: GenerationSummary },

    #[serde(rename = "generation:error")]
    Error { error: String },

    #[serde(rename = "user-edit:detected", rename_all = "camelCase")]
    UserEditDetected {
        filepath: PathBuf,
        component_id: Option<String>,
    },

    #[serde(rename = "user-edit:cleared", rename_all = "camelCase")]
    UserEditCleared {
        filepath: PathBuf,
        component_id: Option<String>,
    },

    #[serde(rename = "user-edit:conflict")]
    UserEditConflict { conflict: UserEditConflict },

    #[serde(rename = "component:removed", rename_all = "camelCase")]
    ComponentRemoved {
        component_id: String,
        filepath: Option<PathBuf>,
        disposition: RemovalDisposition,
    },
}

/// A write skipped because the target was edited by hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEditConflict {
    pub filepath: PathBuf,
    pub component_id: Option<String>,
    pub message: String,
}

/// What happened to a removed component's file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RemovalDisposition {
    Retained,
    /// Kept because the user edited it
    PreservedUserEdit,
    Quarantined,
    Deleted,
    Failed,
}

impl RemovalDisposition {
    pub fn for_policy(policy: RemovedFilePolicy) -> Self {
        match policy {
            RemovedFilePolicy::Retain => RemovalDisposition::Retained,
            RemovedFilePolicy::Quarantine => RemovalDisposition::Quarantined,
            RemovedFilePolicy::Delete => RemovalDisposition::Deleted,
        }
    }
}

impl GenerationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GenerationEvent::Start { .. } => "generation:start",
            GenerationEvent::Progress { .. } => "generation:progress",
            GenerationEvent::Complete { .. } => "generation:complete",
            GenerationEvent::Error { .. } => "generation:error",
            GenerationEvent::UserEditDetected { .. } => "user-edit:detected",
            GenerationEvent::UserEditCleared { .. } => "user-edit:cleared",
            GenerationEvent::UserEditConflict { .. } => "user-edit:conflict",
            GenerationEvent::ComponentRemoved { .. } => "component:removed",
        }
    }
}

/// Fan-out of events to any number of channel subscribers.
///
/// Sending never blocks; subscribers whose receiver was dropped are pruned.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<GenerationEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<GenerationEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub fn emit(&self, event: GenerationEvent) {
        log::trace!("event {}", event.name());
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_receives_events() {
        let bus = EventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.emit(GenerationEvent::Error {
            error: "boom".to_string(),
        });

        assert_eq!(first.try_recv().unwrap().name(), "generation:error");
        assert_eq!(second.try_recv().unwrap().name(), "generation:error");
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());

        bus.emit(GenerationEvent::Start {
            mode: GenerationMode::Full,
            total_components: 1,
        });

        assert_eq!(bus.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }

    #[test]
    fn test_event_serialization_names() {
        let event = GenerationEvent::Progress {
            current: 1,
            total: 2,
            component_id: "a".to_string(),
            component_name: "A".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "generation:progress");
        assert_eq!(json["payload"]["componentName"], "A");

        let start = GenerationEvent::Start {
            mode: GenerationMode::Full,
            total_components: 2,
        };

        let json = serde_json::to_value(&start).unwrap();

        assert_eq!(json["event"], "generation:start");
        assert_eq!(json["payload"]["type"], "full");
        assert_eq!(json["payload"]["totalComponents"], 2);
        assert!(json["payload"].get("mode").is_none());
    }

    #[test]
    fn test_disposition_for_policy() {
        assert_eq!(
            RemovalDisposition::for_policy(RemovedFilePolicy::Quarantine),
            RemovalDisposition::Quarantined
        );
        assert_eq!(
            RemovalDisposition::for_policy(RemovedFilePolicy::Retain),
            RemovalDisposition::Retained
        );
    }
}
