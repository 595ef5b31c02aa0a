//! Per-search transposition table.
//!
//! Maps the position a node stands for, keyed by `(signature, side to
//! move)`, to the node that first reached it. Entries are never removed
//! one by one; the table lives and dies with its search.

use std::collections::HashMap;

use games_arimaa::Player;

use crate::node::NodeId;

#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<(u64, Player), NodeId>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, signature: u64, to_move: Player) -> bool {
        self.entries.contains_key(&(signature, to_move))
    }

    /// Node registered for the position. It may have been pruned since.
    pub fn get(&self, signature: u64, to_move: Player) -> Option<NodeId> {
        self.entries.get(&(signature, to_move)).copied()
    }

    /// Register `node`; an existing entry is kept.
    pub fn insert(&mut self, signature: u64, to_move: Player, node: NodeId) {
        self.entries.entry((signature, to_move)).or_insert(node);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut tt = TranspositionTable::new();
        assert!(tt.is_empty());
        tt.insert(7, Player::Gold, NodeId(3));
        assert!(tt.contains(7, Player::Gold));
        assert!(!tt.contains(7, Player::Silver));
        assert_eq!(tt.get(7, Player::Gold), Some(NodeId(3)));
    }

    #[test]
    fn test_first_entry_wins() {
        let mut tt = TranspositionTable::new();
        tt.insert(7, Player::Gold, NodeId(3));
        tt.insert(7, Player::Gold, NodeId(9));
        assert_eq!(tt.get(7, Player::Gold), Some(NodeId(3)));
        assert_eq!(tt.len(), 1);
        tt.clear();
        assert!(tt.is_empty());
    }
}
