use crate::types::KeyCode;
use std::fmt;

/// Number of held cancellation keys tracked for recovery.
pub const HOLD_BUFFER_CAPACITY: usize = 10;

/// Insertion-ordered set of physically held keys, bounded at `N`.
///
/// A full buffer silently ignores further inserts. Removal shifts the
/// remaining entries left so that positions stay contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldBuffer<const N: usize = HOLD_BUFFER_CAPACITY> {
    keys: [KeyCode; N],
    len: usize,
}

impl<const N: usize> Default for HoldBuffer<N> {
    fn default() -> Self {
        Self {
            keys: [KeyCode::NO; N],
            len: 0,
        }
    }
}

impl<const N: usize> HoldBuffer<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= N
    }

    pub fn as_slice(&self) -> &[KeyCode] {
        &self.keys[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyCode> {
        self.as_slice().iter()
    }

    pub fn contains(&self, key: KeyCode) -> bool {
        self.as_slice().contains(&key)
    }

    /// Appends `key` unless it is already present or the buffer is full.
    /// Returns whether the key was added.
    pub fn insert(&mut self, key: KeyCode) -> bool {
        if self.contains(key) || self.is_full() {
            return false;
        }
        self.keys[self.len] = key;
        self.len += 1;
        true
    }

    /// Removes `key` and closes the gap. Returns whether it was present.
    pub fn remove(&mut self, key: KeyCode) -> bool {
        let Some(idx) = self.as_slice().iter().position(|k| *k == key) else {
            return false;
        };
        self.keys.copy_within(idx + 1..self.len, idx);
        self.len -= 1;
        self.keys[self.len] = KeyCode::NO;
        true
    }

    /// Forgets every tracked key.
    pub fn clear(&mut self) {
        self.keys = [KeyCode::NO; N];
        self.len = 0;
    }

    /// Positional copy for one reconciliation pass.
    pub fn snapshot(&self) -> Snapshot<N> {
        let mut slots = [None; N];
        for (slot, key) in slots.iter_mut().zip(self.as_slice()) {
            *slot = Some(*key);
        }
        Snapshot {
            slots,
            len: self.len,
        }
    }
}

impl<'a, const N: usize> IntoIterator for &'a HoldBuffer<N> {
    type Item = &'a KeyCode;
    type IntoIter = std::slice::Iter<'a, KeyCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<const N: usize> fmt::Display for HoldBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, key) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
        }
        f.write_str("]")
    }
}

/// Scratch copy of a [`HoldBuffer`]. Entries can be cleared but the length
/// never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot<const N: usize = HOLD_BUFFER_CAPACITY> {
    slots: [Option<KeyCode>; N],
    len: usize,
}

impl<const N: usize> Snapshot<N> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<KeyCode> {
        self.slots[..self.len].get(index).copied().flatten()
    }

    /// Clears the first occurrence of `key` strictly before position `end`.
    pub fn clear_before(&mut self, key: KeyCode, end: usize) -> bool {
        let end = end.min(self.len);
        match self.slots[..end].iter_mut().find(|s| **s == Some(key)) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<KeyCode>> + '_ {
        self.slots[..self.len].iter().copied()
    }
}

impl<const N: usize> fmt::Display for Snapshot<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, slot) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match slot {
                Some(key) => write!(f, "{key}")?,
                None => f.write_str("_")?,
            }
        }
        f.write_str("]")
    }
}
