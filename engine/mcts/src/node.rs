//! UCT tree node representation.
//!
//! Each node stands for the position reached by playing its step from the
//! parent's position. Values are kept from gold's point of view in
//! `[-1, 1]`; the node type decides which sign a chooser sees.

use games_arimaa::{Player, Step};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// Whether the player owning a node's step wants the value high or low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Gold's step.
    Max,
    /// Silver's step.
    Min,
}

impl NodeType {
    pub fn of(player: Player) -> Self {
        match player {
            Player::Gold => NodeType::Max,
            Player::Silver => NodeType::Min,
        }
    }

    /// `value` as seen by the owner of this node type.
    #[inline]
    pub fn signed(self, value: f32) -> f32 {
        match self {
            NodeType::Max => value,
            NodeType::Min => -value,
        }
    }

    /// A sample that can only make this node look worse to its owner.
    #[inline]
    pub fn is_unfavourable(self, sample: f32) -> bool {
        match self {
            NodeType::Max => sample <= -1.0,
            NodeType::Min => sample >= 1.0,
        }
    }
}

/// A node in the UCT tree.
#[derive(Debug, Clone)]
pub struct UctNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Step leading here from the parent. The root holds a no-step for the
    /// side to move.
    pub step: Step,

    pub node_type: NodeType,

    pub visits: u32,

    /// Running mean of the samples seen through this node.
    pub value: f32,

    /// Empty until the node is expanded.
    pub children: Vec<NodeId>,

    /// Child picked by the last UCB selection; cleared whenever the
    /// ranking may have changed.
    pub best_cached: Option<NodeId>,
}

impl UctNode {
    pub fn new_root(to_move: Player) -> Self {
        Self::new_child(NodeId::NONE, Step::NoStep(to_move))
    }

    pub fn new_child(parent: NodeId, step: Step) -> Self {
        Self {
            parent,
            step,
            node_type: NodeType::of(step.player()),
            visits: 0,
            value: 0.0,
            children: Vec::new(),
            best_cached: None,
        }
    }

    /// UCB1 urgency given `explore_coeff = explore_rate * ln(parent visits)`.
    /// Unvisited nodes are infinitely urgent.
    #[inline]
    pub fn ucb(&self, explore_coeff: f32) -> f32 {
        if self.visits == 0 {
            return f32::INFINITY;
        }
        self.node_type.signed(self.value) + (explore_coeff / self.visits as f32).sqrt()
    }

    /// Fold one playout sample into the running mean.
    #[inline]
    pub fn update(&mut self, sample: f32) {
        self.visits += 1;
        self.value += (sample - self.value) / self.visits as f32;
    }

    #[inline]
    pub fn is_mature(&self, mature_level: u32) -> bool {
        self.visits > mature_level
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    #[inline]
    pub fn has_one_child(&self) -> bool {
        self.children.len() == 1
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
