//! Typed event subscription.

use serde::Serialize;

use crate::types::CellValue;

/// Something a subscriber may want to know about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GridEvent {
    /// A body cell was pressed
    Click {
        position: usize,
        row: usize,
        column: usize,
    },
    DoubleClick {
        position: usize,
        row: usize,
        column: usize,
    },
    /// A header was pressed outside the resize handle
    HeaderClick { column: usize, field: String },
    /// Scroll position changed; all values in device pixels
    ScrollGeometryChanged {
        pos_x: f64,
        pos_y: f64,
        max_x: f64,
        max_y: f64,
    },
    /// An edit overlay closed with a new value
    EditCommitted {
        row: usize,
        field: String,
        value: CellValue,
    },
}

/// Handle returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GridEvent)>;

/// Plain subscriber list, notified in subscription order.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Observers {
    pub fn subscribe(&mut self, listener: impl FnMut(&GridEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &GridEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
