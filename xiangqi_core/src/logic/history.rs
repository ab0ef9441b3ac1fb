use crate::engine::Move;
use serde::{Deserialize, Serialize};

/// A played move and the board hash right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub mv: Move,
    pub hash: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHistory {
    entries: Vec<HistoryEntry>,
}

impl GameHistory {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, mv: Move, hash: u32) {
        self.entries.push(HistoryEntry { mv, hash });
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn moves(&self) -> impl DoubleEndedIterator<Item = &Move> + '_ {
        self.entries.iter().map(|e| &e.mv)
    }

    pub fn hashes(&self) -> impl DoubleEndedIterator<Item = u32> + '_ {
        self.entries.iter().map(|e| e.hash)
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.entries.last().map(|e| &e.mv)
    }

    pub fn last_hash(&self) -> Option<u32> {
        self.entries.last().map(|e| e.hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
