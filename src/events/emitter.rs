//! Optional publisher handle embedded in every primitive.

use std::sync::Arc;

use super::{Bus, Event, EventKind};

/// Publishes events tagged with a source name, or nothing when no bus is set.
#[derive(Clone, Debug)]
pub(crate) struct Emitter {
    bus: Option<Bus>,
    source: Arc<str>,
}

impl Emitter {
    pub(crate) fn new(source: impl Into<Arc<str>>) -> Self {
        Self {
            bus: None,
            source: source.into(),
        }
    }

    pub(crate) fn set_bus(&mut self, bus: Bus) {
        self.bus = Some(bus);
    }

    pub(crate) fn set_source(&mut self, source: impl Into<Arc<str>>) {
        self.source = source.into();
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    /// Builds and publishes an event; `fill` runs only when a bus is attached.
    pub(crate) fn emit(&self, kind: EventKind, fill: impl FnOnce(Event) -> Event) {
        if let Some(bus) = &self.bus {
            bus.publish(fill(Event::new(kind).with_source(Arc::clone(&self.source))));
        }
    }
}
