use crate::engine::Move;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TTFlag {
    Exact,
    LowerBound, // Beta cutoff (fail-high)
    UpperBound, // Alpha cutoff (fail-low)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u32,
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u8,
    pub flag: TTFlag,
}

/// Hash-keyed cache of search results. When the entry count reaches the
/// capacity the whole table is dropped before the next insert.
pub struct TranspositionTable {
    entries: HashMap<u32, TTEntry>,
    capacity: usize,
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn probe(&self, key: u32) -> Option<TTEntry> {
        self.entries.get(&key).copied()
    }

    /// Score usable as-is for a node searched to `depth` with window
    /// `(alpha, beta)`, if the stored entry is deep enough and its bound fits.
    pub fn lookup(&self, key: u32, depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        let entry = self.entries.get(&key)?;
        if entry.depth < depth {
            return None;
        }
        match entry.flag {
            TTFlag::Exact => Some(entry.score),
            TTFlag::LowerBound if entry.score >= beta => Some(entry.score),
            TTFlag::UpperBound if entry.score <= alpha => Some(entry.score),
            TTFlag::LowerBound | TTFlag::UpperBound => None,
        }
    }

    pub fn get_move(&self, key: u32) -> Option<Move> {
        self.probe(key).and_then(|e| e.best_move)
    }

    /// Keeps the existing entry when it was searched deeper.
    pub fn store(
        &mut self,
        key: u32,
        best_move: Option<Move>,
        score: i32,
        depth: u8,
        flag: TTFlag,
    ) {
        if self.entries.len() >= self.capacity {
            log::debug!("transposition table full ({} entries), clearing", self.capacity);
            self.entries.clear();
        }

        let entry = TTEntry {
            key,
            best_move,
            score,
            depth,
            flag,
        };
        self.entries
            .entry(key)
            .and_modify(|existing| {
                if depth >= existing.depth {
                    *existing = entry;
                }
            })
            .or_insert(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_probe() {
        let mut tt = TranspositionTable::new(16);
        tt.store(42, None, 120, 3, TTFlag::Exact);
        let entry = tt.probe(42).unwrap();
        assert_eq!(entry.score, 120);
        assert_eq!(entry.depth, 3);
        assert!(tt.probe(43).is_none());
    }

    #[test]
    fn test_shallower_store_does_not_replace() {
        let mut tt = TranspositionTable::new(16);
        tt.store(7, None, 50, 4, TTFlag::Exact);
        tt.store(7, None, -10, 2, TTFlag::UpperBound);
        assert_eq!(tt.probe(7).map(|e| e.score), Some(50));

        tt.store(7, None, 60, 4, TTFlag::LowerBound);
        assert_eq!(tt.probe(7).map(|e| e.flag), Some(TTFlag::LowerBound));
    }

    #[test]
    fn test_lookup_respects_bounds_and_depth() {
        let mut tt = TranspositionTable::new(16);
        tt.store(1, None, 30, 3, TTFlag::Exact);
        tt.store(2, None, 200, 3, TTFlag::LowerBound);
        tt.store(3, None, -200, 3, TTFlag::UpperBound);

        assert_eq!(tt.lookup(1, 3, -100, 100), Some(30));
        assert_eq!(tt.lookup(1, 4, -100, 100), None);

        assert_eq!(tt.lookup(2, 2, -100, 100), Some(200));
        assert_eq!(tt.lookup(2, 2, -100, 300), None);

        assert_eq!(tt.lookup(3, 1, -100, 100), Some(-200));
        assert_eq!(tt.lookup(3, 1, -300, 100), None);
    }

    #[test]
    fn test_full_table_is_wiped() {
        let mut tt = TranspositionTable::new(3);
        for key in 0..3 {
            tt.store(key, None, 0, 1, TTFlag::Exact);
        }
        assert_eq!(tt.len(), 3);
        tt.store(99, None, 0, 1, TTFlag::Exact);
        assert_eq!(tt.len(), 1);
        assert!(tt.probe(0).is_none());
        assert!(tt.probe(99).is_some());
    }
}
