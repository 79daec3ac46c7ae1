//! Arena-backed UCT search tree.
//!
//! Nodes live in a contiguous `Vec` and refer to each other by [`NodeId`].
//! A parent owns its children through the arena; the child's `parent` field
//! is a plain index used only when walking back up during backpropagation.

use std::fmt::{self, Write as _};

use crate::game::{GameState, Player};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One explored position, reached by `mv` from `parent`.
///
/// `wins` is always from the viewpoint of `player_just_moved`.
#[derive(Debug, Clone)]
pub struct Node<M> {
    /// Move that produced this node (`None` for the root)
    pub mv: Option<M>,
    /// Parent node (`None` for the root)
    pub parent: Option<NodeId>,
    /// Expanded children, in expansion order
    pub children: Vec<NodeId>,
    /// Legal moves not yet expanded into a child
    pub untried: Vec<M>,
    /// Number of playouts that passed through this node
    pub visits: u32,
    /// Sum of playout results for `player_just_moved`
    pub wins: f64,
    /// The player whose move produced this position
    pub player_just_moved: Player,
}

impl<M> Node<M> {
    fn new(mv: Option<M>, parent: Option<NodeId>, untried: Vec<M>, player: Player) -> Self {
        Self {
            mv,
            parent,
            children: Vec::new(),
            untried,
            visits: 0,
            wins: 0.0,
            player_just_moved: player,
        }
    }

    /// Observed win rate. Returns 0.0 for an unvisited node.
    #[inline]
    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / self.visits as f64
        }
    }

    /// Every legal move has a child.
    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// UCB1 score of this node as a child of a parent with `ln_parent_visits`.
    ///
    /// Returns `None` when the node has never been visited.
    #[inline]
    pub fn ucb1(&self, ln_parent_visits: f64) -> Option<f64> {
        if self.visits == 0 {
            return None;
        }
        let n = self.visits as f64;
        Some(self.wins / n + (2.0 * ln_parent_visits / n).sqrt())
    }
}

/// Why UCB1 selection could not produce a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectError {
    /// The node has no children to choose from.
    NoChildren(NodeId),
    /// The parent, or the given child, has zero visits.
    ZeroVisits(NodeId),
}

/// Summary of a finished search, for logging and drivers.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport<M> {
    pub best: M,
    pub tree_size: usize,
    pub root_visits: u32,
    pub best_visits: u32,
    pub best_win_rate: f64,
}

/// The search tree for a single decision.
#[derive(Debug, Clone)]
pub struct Tree<M> {
    nodes: Vec<Node<M>>,
}

impl<M: Copy + PartialEq + fmt::Display> Tree<M> {
    /// Create a tree whose root is the given position.
    pub fn new<G: GameState<Move = M>>(state: &G) -> Self {
        let root = Node::new(None, None, state.legal_moves(), state.last_mover());
        Self { nodes: vec![root] }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node<M> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<M> {
        &mut self.nodes[id.index()]
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true after construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, in creation order.
    #[inline]
    pub fn nodes(&self) -> &[Node<M>] {
        &self.nodes
    }

    /// Children of `id` as `(NodeId, &Node)` pairs, in expansion order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node<M>)> + '_ {
        self.get(id).children.iter().map(|&c| (c, self.get(c)))
    }

    /// Create a child of `parent` for `mv`, removing it from the untried set.
    ///
    /// `untried` and `player` describe the position after `mv` was applied.
    pub fn add_child(&mut self, parent: NodeId, mv: M, untried: Vec<M>, player: Player) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(Some(mv), Some(parent), untried, player));

        let p = self.get_mut(parent);
        if let Some(pos) = p.untried.iter().position(|m| *m == mv) {
            p.untried.remove(pos);
        }
        p.children.push(id);
        id
    }

    /// Pick the child of `id` maximising UCB1.
    ///
    /// Ties go to the first child in expansion order.
    pub fn select_child(&self, id: NodeId) -> Result<NodeId, SelectError> {
        let node = self.get(id);
        if node.children.is_empty() {
            return Err(SelectError::NoChildren(id));
        }
        if node.visits == 0 {
            return Err(SelectError::ZeroVisits(id));
        }
        let ln_parent = (node.visits as f64).ln();

        let mut best: Option<(NodeId, f64)> = None;
        for (child_id, child) in self.children(id) {
            let score = child.ucb1(ln_parent).ok_or(SelectError::ZeroVisits(child_id))?;
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((child_id, score));
            }
        }
        best.map(|(c, _)| c).ok_or(SelectError::NoChildren(id))
    }

    /// Record one playout through `id` and every ancestor.
    ///
    /// `result` is asked once per node, with that node's `player_just_moved`.
    pub fn backpropagate(&mut self, id: NodeId, mut result: impl FnMut(Player) -> f64) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get_mut(node_id);
            node.visits += 1;
            node.wins += result(node.player_just_moved);
            current = node.parent;
        }
    }

    /// The most-visited child of the root, first one on ties.
    pub fn best_child(&self) -> Option<NodeId> {
        let mut best: Option<(NodeId, u32)> = None;
        for (child_id, child) in self.children(self.root()) {
            if best.is_none_or(|(_, v)| child.visits > v) {
                best = Some((child_id, child.visits));
            }
        }
        best.map(|(c, _)| c)
    }

    /// Move leading to the most-visited child of the root.
    pub fn best_move(&self) -> Option<M> {
        self.best_child().and_then(|id| self.get(id).mv)
    }

    pub fn report(&self) -> Option<SearchReport<M>> {
        let id = self.best_child()?;
        let best = self.get(id);
        Some(SearchReport {
            best: best.mv?,
            tree_size: self.len(),
            root_visits: self.get(self.root()).visits,
            best_visits: best.visits,
            best_win_rate: best.win_rate(),
        })
    }

    /// Depth of the deepest node below the root.
    pub fn max_depth(&self) -> usize {
        let mut depth = 0;
        let mut stack = vec![(self.root(), 0)];
        while let Some((id, d)) = stack.pop() {
            depth = depth.max(d);
            stack.extend(self.get(id).children.iter().map(|&c| (c, d + 1)));
        }
        depth
    }

    /// One-line summary of a node: move, wins/visits and untried moves.
    pub fn node_label(&self, id: NodeId) -> String {
        let node = self.get(id);
        let mv = node.mv.map_or_else(|| "None".to_string(), |m| m.to_string());
        let untried: Vec<String> = node.untried.iter().map(ToString::to_string).collect();
        format!(
            "[M:{mv} W/V:{}/{} U:[{}]]",
            node.wins,
            node.visits,
            untried.join(", ")
        )
    }

    /// Indented listing of the whole tree, one node per line.
    ///
    /// Each line starts with a newline followed by `"| "` once per level of
    /// depth.
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            out.push('\n');
            out.push_str(&"| ".repeat(depth));
            out.push_str(&self.node_label(id));
            // Reverse so children come out in expansion order.
            stack.extend(self.get(id).children.iter().rev().map(|&c| (c, depth + 1)));
        }
        out
    }

    /// The root's children, one per line.
    pub fn children_to_string(&self) -> String {
        let mut out = String::new();
        for &child in &self.get(self.root()).children {
            let _ = writeln!(out, "{}", self.node_label(child));
        }
        out
    }
}
