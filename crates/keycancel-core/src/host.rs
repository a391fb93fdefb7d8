use crate::types::{HostEvent, HostReport, KeyAction, KeyCode, KeyEdge};
use std::collections::BTreeSet;

/// What the host currently believes is held.
///
/// Mirrors the firmware report: synthetic changes land first, then the
/// original event if the engine let it through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostState {
    held: BTreeSet<KeyCode>,
}

impl HostState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn held(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.held.iter().copied()
    }

    pub fn apply(&mut self, events: &[HostEvent]) {
        for ev in events {
            match *ev {
                HostEvent::Release(k) => self.release(k),
                HostEvent::Register(k) => self.register(k),
            }
        }
    }

    /// Applies the original transition when the engine passed it.
    pub fn forward(&mut self, key: KeyCode, edge: KeyEdge, action: KeyAction) {
        if action == KeyAction::Block {
            return;
        }
        match edge {
            KeyEdge::Down => self.register(key),
            KeyEdge::Up => self.release(key),
        }
    }
}

impl HostReport for HostState {
    fn release(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }

    fn register(&mut self, key: KeyCode) {
        self.held.insert(key);
    }
}
