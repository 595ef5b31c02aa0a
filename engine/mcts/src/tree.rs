//! UCT tree structure with arena allocation.
//!
//! Nodes live in a slot arena and are referenced by `NodeId`. Child edges
//! own their nodes: removing a child frees its whole subtree and recycles
//! the slots. Parent edges are plain indices; a handle whose slot was freed
//! is stale and must be checked with [`UctTree::try_get`] before use.

use games_arimaa::{Player, Step};
use tracing::trace;

use crate::node::{NodeId, UctNode};

/// UCT tree with arena-based node storage.
#[derive(Debug)]
pub struct UctTree {
    slots: Vec<Option<UctNode>>,
    free: Vec<u32>,
    root: NodeId,
    live: usize,
}

impl UctTree {
    /// Create a tree whose root stands for a position with `to_move` on turn.
    pub fn new(to_move: Player) -> Self {
        Self {
            slots: vec![Some(UctNode::new_root(to_move))],
            free: Vec::new(),
            root: NodeId(0),
            live: 1,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// # Panics
    /// If the handle is stale.
    #[inline]
    pub fn get(&self, id: NodeId) -> &UctNode {
        self.try_get(id)
            .unwrap_or_else(|| panic!("stale node handle {id:?}"))
    }

    /// # Panics
    /// If the handle is stale.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut UctNode {
        self.slots
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("stale node handle {id:?}"))
    }

    /// The node behind `id`, or `None` if it has been removed.
    #[inline]
    pub fn try_get(&self, id: NodeId) -> Option<&UctNode> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    /// Number of live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn allocate(&mut self, node: UctNode) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() as u32 - 1)
            }
        }
    }

    /// Add one child per step under `parent`, returning the new ids in
    /// step order.
    pub fn expand(&mut self, parent: NodeId, steps: &[Step]) -> Vec<NodeId> {
        let ids: Vec<NodeId> = steps
            .iter()
            .map(|step| self.allocate(UctNode::new_child(parent, *step)))
            .collect();
        let node = self.get_mut(parent);
        node.children.extend_from_slice(&ids);
        node.best_cached = None;
        trace!(node = parent.0, children = ids.len(), "expanded");
        ids
    }

    /// Pick the child with the highest UCB1 urgency, reusing the cached
    /// choice while it is still valid.
    pub fn select_child(&mut self, id: NodeId, explore_rate: f32) -> Option<NodeId> {
        let node = self.get(id);
        if let Some(best) = node.best_cached {
            if self.try_get(best).is_some() {
                return Some(best);
            }
        }

        let explore_coeff = explore_rate * (node.visits.max(1) as f32).ln();
        let mut best = None;
        let mut best_urgency = f32::NEG_INFINITY;
        for &child in &node.children {
            let urgency = self.get(child).ucb(explore_coeff);
            if best.is_none() || urgency > best_urgency {
                best = Some(child);
                best_urgency = urgency;
            }
        }

        self.get_mut(id).best_cached = best;
        best
    }

    /// Most visited child; the first one wins ties.
    pub fn most_visited_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<(NodeId, u32)> = None;
        for &child in &self.get(id).children {
            let visits = self.get(child).visits;
            if best.map_or(true, |(_, v)| visits > v) {
                best = Some((child, visits));
            }
        }
        best.map(|(child, _)| child)
    }

    /// Fold `sample` into every node of `path` (root first).
    ///
    /// A parent's cached selection is dropped when a child gets its first
    /// visit or a sample that is bad for the child's owner.
    pub fn backpropagate(&mut self, path: &[NodeId], sample: f32) {
        for (i, &id) in path.iter().enumerate() {
            let node = self.get_mut(id);
            node.update(sample);
            let stale = node.visits == 1 || node.node_type.is_unfavourable(sample);
            if stale && i > 0 {
                self.get_mut(path[i - 1]).best_cached = None;
            }
        }
    }

    /// Remove a dead leaf, climbing while each ancestor would be left
    /// without children. Every remaining ancestor loses the removed visits.
    /// The root is never removed.
    ///
    /// Returns the number of nodes freed.
    pub fn remove_node_cascade(&mut self, node: NodeId) -> usize {
        let mut to_remove = node;
        let mut ancestor = self.get(node).parent;
        while ancestor.is_some() && self.get(ancestor).has_one_child() {
            to_remove = ancestor;
            ancestor = self.get(ancestor).parent;
        }
        if ancestor.is_none() {
            return 0;
        }

        let removed_visits = self.get(to_remove).visits;
        let parent = self.get_mut(ancestor);
        parent.children.retain(|&c| c != to_remove);
        parent.best_cached = None;

        let mut up = ancestor;
        while up.is_some() {
            let n = self.get_mut(up);
            n.visits = n.visits.saturating_sub(removed_visits);
            up = n.parent;
        }

        let freed = self.free_subtree(to_remove);
        trace!(node = to_remove.0, freed, removed_visits, "removed dead subtree");
        freed
    }

    fn free_subtree(&mut self, id: NodeId) -> usize {
        let mut stack = vec![id];
        let mut freed = 0;
        while let Some(id) = stack.pop() {
            if let Some(node) = self.slots.get_mut(id.0 as usize).and_then(Option::take) {
                stack.extend(node.children);
                self.free.push(id.0);
                self.live -= 1;
                freed += 1;
            }
        }
        freed
    }

    /// Sum of the visit counts of `id`'s children.
    pub fn children_visits(&self, id: NodeId) -> u32 {
        self.get(id)
            .children
            .iter()
            .map(|&c| self.get(c).visits)
            .sum()
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0u32)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(self.get(id).children.iter().map(|&c| (c, depth + 1)));
        }
        TreeStats {
            total_nodes: self.live,
            root_visits: root.visits,
            root_value: root.value,
            max_depth,
        }
    }
}

/// Statistics about a UCT tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f32,
    pub max_depth: u32,
}
