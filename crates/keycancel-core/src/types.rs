use serde::{Deserialize, Serialize};

/// 16-bit keycode as it appears in the keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEdge {
    Down,
    Up,
}

/// Position in the scan matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

impl KeyPos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// A single matrix transition, handed to the engine together with the keycode
/// the keymap resolved for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub edge: KeyEdge,
    pub pos: Option<KeyPos>,
}

impl KeyEvent {
    pub const fn down() -> Self {
        Self {
            edge: KeyEdge::Down,
            pos: None,
        }
    }

    pub const fn up() -> Self {
        Self {
            edge: KeyEdge::Up,
            pos: None,
        }
    }

    pub const fn at(self, row: u8, col: u8) -> Self {
        Self {
            edge: self.edge,
            pos: Some(KeyPos::new(row, col)),
        }
    }

    pub const fn is_pressed(&self) -> bool {
        matches!(self.edge, KeyEdge::Down)
    }
}

/// Whether the original event should still reach the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Pass,
    Block,
}

/// Synthetic report change emitted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    Release(KeyCode),
    Register(KeyCode),
}

/// Host report primitives the engine drives.
pub trait HostReport {
    /// Drop `key` from the report, whether or not it is present.
    fn release(&mut self, key: KeyCode);
    /// Report `key` as held.
    fn register(&mut self, key: KeyCode);
}

impl HostReport for Vec<HostEvent> {
    fn release(&mut self, key: KeyCode) {
        self.push(HostEvent::Release(key));
    }

    fn register(&mut self, key: KeyCode) {
        self.push(HostEvent::Register(key));
    }
}

impl<H: HostReport + ?Sized> HostReport for &mut H {
    fn release(&mut self, key: KeyCode) {
        (**self).release(key);
    }

    fn register(&mut self, key: KeyCode) {
        (**self).register(key);
    }
}
