//! Cycle Collapsing
//!
//! Detects strongly connected components in the copy-edge graph and folds
//! each one into a single representative node. Nodes on a copy cycle are
//! provably points-to-equivalent, so keeping them separate only multiplies
//! propagation work.
//!
//! The traversal is a depth-first search producing discovery-order numbers
//! and a tentative representative per node: when a successor is not yet
//! finalized into a component, the node adopts whichever of the two current
//! representatives was discovered *earlier* (the smaller discovery order is
//! the cycle root). A node that finishes as its own representative closes a
//! component and finalizes every pending node discovered after it.
//!
//! The search runs on an explicit frame stack rather than recursion, so
//! component depth is bounded by heap, not call stack. The per-successor
//! representative update is applied when the successor's frame completes,
//! which preserves the recursive formulation's semantics exactly.
//!
//! # References
//! - Nuutila, E. "On Finding the Strongly Connected Components" (1994)

use crate::features::points_to::domain::constraint::NodeId;
use crate::features::points_to::domain::constraint_graph::ConstraintGraph;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

/// DFS frame: a node and its snapshot of successors with an iteration cursor
struct Frame {
    node: NodeId,
    successors: Vec<NodeId>,
    cursor: usize,
}

/// Shared traversal state across one collapse pass
struct CollapseState {
    /// Discovery order, 0 = unvisited
    order: FxHashMap<NodeId, u32>,
    /// Tentative representative, initialized to self
    repr: FxHashMap<NodeId, NodeId>,
    /// Nodes already finalized into a component
    finalized: FxHashSet<NodeId>,
    /// Nodes awaiting their component root, most recent on top
    pending: Vec<NodeId>,
    counter: u32,
}

impl CollapseState {
    fn new(roots: &[NodeId]) -> Self {
        Self {
            order: roots.iter().map(|&v| (v, 0)).collect(),
            repr: roots.iter().map(|&v| (v, v)).collect(),
            finalized: FxHashSet::default(),
            pending: Vec::new(),
            counter: 0,
        }
    }

    #[inline]
    fn order_of(&self, v: NodeId) -> u32 {
        self.order.get(&v).copied().unwrap_or(0)
    }

    #[inline]
    fn repr_of(&self, v: NodeId) -> NodeId {
        self.repr.get(&v).copied().unwrap_or(v)
    }

    /// Adopt the earlier-discovered representative between `node`'s and
    /// `succ`'s, unless `succ` already belongs to a closed component
    fn adopt_repr(&mut self, node: NodeId, succ: NodeId) {
        if self.finalized.contains(&succ) {
            return;
        }
        let rn = self.repr_of(node);
        let rs = self.repr_of(succ);
        if self.order_of(rs) < self.order_of(rn) {
            self.repr.insert(node, rs);
        }
    }

    /// Close the component rooted at `node`, or park it on the pending stack
    fn finish(&mut self, node: NodeId) {
        if self.repr_of(node) == node {
            self.finalized.insert(node);
            let cut = self.order_of(node);
            while let Some(&w) = self.pending.last() {
                if self.order_of(w) <= cut {
                    break;
                }
                self.pending.pop();
                self.finalized.insert(w);
                self.repr.insert(w, node);
            }
        } else {
            self.pending.push(node);
        }
    }
}

/// Run one collapse pass over the whole live graph
///
/// Returns the number of nodes merged away.
pub fn collapse_cycles(graph: &mut ConstraintGraph) -> usize {
    let roots = graph.live_nodes();
    let mut state = CollapseState::new(&roots);

    for &v in &roots {
        if state.order_of(v) == 0 {
            visit(graph, v, &mut state);
        }
    }

    let mut merged = 0;
    for &v in &roots {
        let rep = state.repr_of(v);
        if rep != v {
            graph.merge(v, rep);
            merged += 1;
        }
    }
    if merged > 0 {
        trace!(merged, live = graph.live_count(), "collapsed copy cycles");
    }
    merged
}

/// Depth-first search from `root` over the copy-edge graph, iterative
fn visit(graph: &ConstraintGraph, root: NodeId, state: &mut CollapseState) {
    state.counter += 1;
    state.order.insert(root, state.counter);
    let mut frames = vec![Frame {
        node: root,
        successors: graph.subset_out(root),
        cursor: 0,
    }];

    while !frames.is_empty() {
        let depth = frames.len() - 1;
        let node = frames[depth].node;
        let cursor = frames[depth].cursor;

        if cursor < frames[depth].successors.len() {
            let succ = frames[depth].successors[cursor];
            if state.order_of(succ) == 0 {
                // Descend; the representative update for this successor is
                // applied when its frame completes.
                state.counter += 1;
                state.order.insert(succ, state.counter);
                let successors = graph.subset_out(succ);
                frames.push(Frame {
                    node: succ,
                    successors,
                    cursor: 0,
                });
                continue;
            }
            frames[depth].cursor += 1;
            state.adopt_repr(node, succ);
        } else {
            frames.pop();
            state.finish(node);
            if let Some(parent) = frames.last_mut() {
                let pnode = parent.node;
                let succ = parent.successors[parent.cursor];
                parent.cursor += 1;
                debug_assert_eq!(succ, node);
                state.adopt_repr(pnode, succ);
            }
        }
    }
}
