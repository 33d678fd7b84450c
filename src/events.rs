//! Typed scan events and listener registration.
//!
//! Listeners are registered per [`EventKind`]. Binding a listener for a kind
//! replaces the previous one, and triggering a kind with no listener does
//! nothing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::fields::ExtractionResult;
use crate::location::LocationData;

/// Events emitted while scanning a resume.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "detail")]
pub enum ScanEvent {
    /// Dependency, validation or processing failure.
    Error { message: String },
    /// Text extraction has started.
    ScanProgress,
    /// Contact fields extracted from the document.
    ScanComplete(ExtractionResult),
    /// Reverse geocoding result for the device position.
    FoundLocation(LocationData),
}

impl ScanEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ScanEvent::Error { .. } => EventKind::Error,
            ScanEvent::ScanProgress => EventKind::ScanProgress,
            ScanEvent::ScanComplete(_) => EventKind::ScanComplete,
            ScanEvent::FoundLocation(_) => EventKind::FoundLocation,
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        ScanEvent::Error {
            message: message.into(),
        }
    }
}

/// Discriminant used to register listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Error,
    ScanProgress,
    ScanComplete,
    FoundLocation,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Error => "Error",
            EventKind::ScanProgress => "ScanProgress",
            EventKind::ScanComplete => "ScanComplete",
            EventKind::FoundLocation => "FoundLocation",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

type Listener = Arc<dyn Fn(&ScanEvent) + Send + Sync>;

/// Registry of one listener per event kind.
#[derive(Default, Clone)]
pub struct EventBus {
    listeners: Arc<RwLock<HashMap<EventKind, Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `kind`, replacing any existing listener.
    pub fn on<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&ScanEvent) + Send + Sync + 'static,
    {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if listeners.insert(kind, Arc::new(listener)).is_some() {
            tracing::debug!("Replaced existing {} listener", kind);
        }
    }

    /// Remove the listener for `kind`, if any.
    pub fn off(&self, kind: EventKind) {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&kind);
    }

    pub fn is_bound(&self, kind: EventKind) -> bool {
        self.listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(&kind)
    }

    /// Deliver `event` to the listener bound for its kind.
    pub fn trigger(&self, event: &ScanEvent) {
        // Clone the handle so a listener may rebind without deadlocking.
        let listener = self
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&event.kind())
            .cloned();

        match listener {
            Some(listener) => listener(event),
            None => tracing::trace!("No listener bound for {}", event.kind()),
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<EventKind> = self
            .listeners
            .read()
            .map(|l| l.keys().copied().collect())
            .unwrap_or_default();
        f.debug_struct("EventBus").field("bound", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_trigger_reaches_bound_listener() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        bus.on(EventKind::ScanProgress, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.trigger(&ScanEvent::ScanProgress);
        bus.trigger(&ScanEvent::error("ignored"));

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rebinding_replaces_listener() {
        let bus = EventBus::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = first.clone();
        bus.on(EventKind::Error, move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        });
        let s = second.clone();
        bus.on(EventKind::Error, move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });

        bus.trigger(&ScanEvent::error("boom"));

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_off_unbinds() {
        let bus = EventBus::new();
        bus.on(EventKind::FoundLocation, |_| panic!("should be unbound"));
        assert!(bus.is_bound(EventKind::FoundLocation));

        bus.off(EventKind::FoundLocation);
        assert!(!bus.is_bound(EventKind::FoundLocation));
        bus.trigger(&ScanEvent::FoundLocation(LocationData::default()));
    }

    #[test]
    fn test_event_serializes_with_detail() {
        let event = ScanEvent::error("bad file");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "Error");
        assert_eq!(json["detail"]["message"], "bad file");
    }
}
