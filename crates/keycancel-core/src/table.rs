use crate::types::KeyCode;
use serde::{Deserialize, Serialize};

/// While `press` is held, `unpress` must not be reported as held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CancellationPair {
    pub press: KeyCode,
    pub unpress: KeyCode,
}

impl CancellationPair {
    pub const fn new(press: KeyCode, unpress: KeyCode) -> Self {
        Self { press, unpress }
    }
}

/// Classic SOCD layout: left/right and up/down on WASD cancel each other.
pub const SOCD_WASD: [CancellationPair; 4] = [
    CancellationPair::new(KeyCode::A, KeyCode::D),
    CancellationPair::new(KeyCode::D, KeyCode::A),
    CancellationPair::new(KeyCode::W, KeyCode::S),
    CancellationPair::new(KeyCode::S, KeyCode::W),
];

/// Ordered, indexable source of cancellation pairs.
///
/// Indices run `0..count()`. Duplicate entries are allowed and are applied
/// once per occurrence.
pub trait CancellationTable {
    fn count(&self) -> usize;

    fn get(&self, index: usize) -> Option<CancellationPair>;

    fn pairs(&self) -> Pairs<'_, Self> {
        Pairs {
            table: self,
            index: 0,
        }
    }

    /// Pairs whose `press` side is `key`, in table order.
    fn pairs_pressing(&self, key: KeyCode) -> PairsPressing<'_, Self> {
        PairsPressing {
            inner: self.pairs(),
            key,
        }
    }

    /// True if `key` is the `press` side of at least one pair.
    fn is_press_key(&self, key: KeyCode) -> bool {
        self.pairs().any(|p| p.press == key)
    }
}

pub struct Pairs<'a, T: ?Sized> {
    table: &'a T,
    index: usize,
}

impl<T: CancellationTable + ?Sized> Iterator for Pairs<'_, T> {
    type Item = CancellationPair;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.table.count() {
            let i = self.index;
            self.index += 1;
            if let Some(pair) = self.table.get(i) {
                return Some(pair);
            }
        }
        None
    }
}

pub struct PairsPressing<'a, T: ?Sized> {
    inner: Pairs<'a, T>,
    key: KeyCode,
}

impl<T: CancellationTable + ?Sized> Iterator for PairsPressing<'_, T> {
    type Item = CancellationPair;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.key;
        self.inner.find(|p| p.press == key)
    }
}

impl CancellationTable for [CancellationPair] {
    fn count(&self) -> usize {
        self.len()
    }

    fn get(&self, index: usize) -> Option<CancellationPair> {
        <[CancellationPair]>::get(self, index).copied()
    }
}

impl<const N: usize> CancellationTable for [CancellationPair; N] {
    fn count(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Option<CancellationPair> {
        self.as_slice().get(index).copied()
    }
}

impl CancellationTable for Vec<CancellationPair> {
    fn count(&self) -> usize {
        self.len()
    }

    fn get(&self, index: usize) -> Option<CancellationPair> {
        self.as_slice().get(index).copied()
    }
}

impl<T: CancellationTable + ?Sized> CancellationTable for &T {
    fn count(&self) -> usize {
        (**self).count()
    }

    fn get(&self, index: usize) -> Option<CancellationPair> {
        (**self).get(index)
    }
}

/// Owned cancellation table, usually built from a table file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairTable {
    pub name: Option<String>,
    pub pairs: Vec<CancellationPair>,
}

impl PairTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, press: KeyCode, unpress: KeyCode) -> &mut Self {
        self.pairs.push(CancellationPair::new(press, unpress));
        self
    }

    /// Adds `a -> b` and `b -> a`.
    pub fn push_symmetric(&mut self, a: KeyCode, b: KeyCode) -> &mut Self {
        self.push(a, b).push(b, a)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl From<Vec<CancellationPair>> for PairTable {
    fn from(pairs: Vec<CancellationPair>) -> Self {
        Self { name: None, pairs }
    }
}

impl FromIterator<CancellationPair> for PairTable {
    fn from_iter<I: IntoIterator<Item = CancellationPair>>(iter: I) -> Self {
        Self {
            name: None,
            pairs: iter.into_iter().collect(),
        }
    }
}

impl CancellationTable for PairTable {
    fn count(&self) -> usize {
        self.pairs.len()
    }

    fn get(&self, index: usize) -> Option<CancellationPair> {
        self.pairs.as_slice().get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_pressing_keeps_table_order_and_duplicates() {
        let mut table = PairTable::new();
        table
            .push(KeyCode::A, KeyCode::D)
            .push(KeyCode::W, KeyCode::S)
            .push(KeyCode::A, KeyCode::LEFT)
            .push(KeyCode::A, KeyCode::D);

        let targets: Vec<KeyCode> = table
            .pairs_pressing(KeyCode::A)
            .map(|p| p.unpress)
            .collect();
        assert_eq!(targets, vec![KeyCode::D, KeyCode::LEFT, KeyCode::D]);
    }

    #[test]
    fn test_is_press_key_is_directional() {
        let mut table = PairTable::new();
        table.push(KeyCode::A, KeyCode::D);
        assert!(table.is_press_key(KeyCode::A));
        assert!(!table.is_press_key(KeyCode::D));
    }

    #[test]
    fn test_builtin_socd_table() {
        assert_eq!(SOCD_WASD.count(), 4);
        assert!(SOCD_WASD.is_press_key(KeyCode::S));
        assert_eq!(
            SOCD_WASD.pairs_pressing(KeyCode::D).next(),
            Some(CancellationPair::new(KeyCode::D, KeyCode::A))
        );
        assert_eq!(CancellationTable::get(&SOCD_WASD, 4), None);
    }
}
