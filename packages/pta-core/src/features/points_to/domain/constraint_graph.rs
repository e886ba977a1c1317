//! Constraint Graph (Node Store)
//!
//! Owns the set of live node identifiers, each node's current representative,
//! and the per-node constraint tables:
//! - `subset_out`/`subset_in`: mutually inverse copy-edge adjacency; an edge
//!   u -> v means pts(v) ⊇ pts(u)
//! - `stores_at`/`loads_from`: pending `*n = b` / `a = *n` constraints
//! - `points_to`: the monotonically growing points-to approximation
//!
//! Nodes live in an arena and are never removed: collapsing a cycle folds a
//! node's tables into the surviving representative and clears its liveness
//! flag, so no table entry ever dangles. Representative lookup is a single
//! field read; `merge` eagerly rewrites the representative pointer of every
//! id the merged node had previously absorbed, so chains never form.
//!
//! All query surfaces (successor snapshots, exported mappings, the dump text)
//! are sorted by node id; hash-map iteration order is never exposed.

use super::constraint::NodeId;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// Per-node record in the arena
#[derive(Debug, Clone)]
struct NodeRecord {
    id: NodeId,
    representative: NodeId,
    live: bool,
    subset_out: FxHashSet<NodeId>,
    subset_in: FxHashSet<NodeId>,
    stores_at: FxHashSet<NodeId>,
    loads_from: FxHashSet<NodeId>,
    points_to: FxHashSet<NodeId>,
    /// Ids merged into this node so far; used to keep representative lookups
    /// single-hop when this node is itself merged away later.
    absorbed: Vec<NodeId>,
}

impl NodeRecord {
    fn new(id: NodeId) -> Self {
        Self {
            id,
            representative: id,
            live: true,
            subset_out: FxHashSet::default(),
            subset_in: FxHashSet::default(),
            stores_at: FxHashSet::default(),
            loads_from: FxHashSet::default(),
            points_to: FxHashSet::default(),
            absorbed: Vec::new(),
        }
    }
}

/// The constraint graph: arena of node records plus an id -> slot index map
///
/// Every operation is total: missing nodes are created on first use and
/// missing table entries read as empty sets. Merged ids transparently resolve
/// to their representative wherever adjacency or points-to data is consulted.
#[derive(Debug, Clone, Default)]
pub struct ConstraintGraph {
    slots: FxHashMap<NodeId, usize>,
    nodes: Vec<NodeRecord>,
}

impl ConstraintGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Node Management
    // ═══════════════════════════════════════════════════════════════════════

    /// Add a node if it doesn't already exist (idempotent)
    pub fn ensure_node(&mut self, id: NodeId) {
        if !self.slots.contains_key(&id) {
            self.slots.insert(id, self.nodes.len());
            self.nodes.push(NodeRecord::new(id));
        }
    }

    /// Check whether the id was ever introduced
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Check whether the id is live (not merged away). Unknown ids are not
    /// live.
    #[inline]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.slot(id).map(|n| n.live).unwrap_or(false)
    }

    /// Current representative of a node. O(1): merge rewrites pointers
    /// eagerly, so this never chains. Unknown ids represent themselves.
    #[inline]
    pub fn representative(&self, id: NodeId) -> NodeId {
        self.slot(id).map(|n| n.representative).unwrap_or(id)
    }

    /// Number of nodes ever introduced (merged ids included)
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live nodes
    #[inline]
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.live).count()
    }

    /// All live node ids in ascending order
    pub fn live_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.live)
            .map(|n| n.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// All node ids ever introduced, in ascending order
    pub fn all_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        ids.sort_unstable();
        ids
    }

    #[inline]
    fn slot(&self, id: NodeId) -> Option<&NodeRecord> {
        self.slots.get(&id).map(|&i| &self.nodes[i])
    }

    #[inline]
    fn index_of(&self, id: NodeId) -> usize {
        self.slots[&id]
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Subset Edges
    // ═══════════════════════════════════════════════════════════════════════

    /// Insert a subset edge from -> to (pts(to) ⊇ pts(from))
    ///
    /// Both endpoints are resolved through their representatives first; edges
    /// between ids that share a representative are rejected, so merged ids
    /// never reappear as edge endpoints and no self-loops exist.
    ///
    /// Returns true if the edge was not present before.
    pub fn add_subset_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        self.ensure_node(from);
        self.ensure_node(to);
        let from = self.representative(from);
        let to = self.representative(to);
        if from == to {
            return false;
        }
        let fi = self.index_of(from);
        let inserted = self.nodes[fi].subset_out.insert(to);
        if inserted {
            let ti = self.index_of(to);
            self.nodes[ti].subset_in.insert(from);
        }
        inserted
    }

    /// Check for a subset edge between the representatives of from/to
    pub fn has_subset_edge(&self, from: NodeId, to: NodeId) -> bool {
        let from = self.representative(from);
        let to = self.representative(to);
        self.slot(from)
            .map(|n| n.subset_out.contains(&to))
            .unwrap_or(false)
    }

    /// Outgoing subset successors of a node's representative, ascending
    pub fn subset_out(&self, id: NodeId) -> Vec<NodeId> {
        let rep = self.representative(id);
        let mut out: Vec<NodeId> = self
            .slot(rep)
            .map(|n| n.subset_out.iter().copied().collect())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }

    /// Incoming subset predecessors of a node's representative, ascending
    pub fn subset_in(&self, id: NodeId) -> Vec<NodeId> {
        let rep = self.representative(id);
        let mut inc: Vec<NodeId> = self
            .slot(rep)
            .map(|n| n.subset_in.iter().copied().collect())
            .unwrap_or_default();
        inc.sort_unstable();
        inc
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Store/Load Constraint Tables
    // ═══════════════════════════════════════════════════════════════════════

    /// Record a store constraint *node = b
    pub fn add_store(&mut self, node: NodeId, b: NodeId) -> bool {
        self.ensure_node(node);
        self.ensure_node(b);
        let rep = self.representative(node);
        let i = self.index_of(rep);
        self.nodes[i].stores_at.insert(b)
    }

    /// Record a load constraint a = *node
    pub fn add_load(&mut self, node: NodeId, a: NodeId) -> bool {
        self.ensure_node(node);
        self.ensure_node(a);
        let rep = self.representative(node);
        let i = self.index_of(rep);
        self.nodes[i].loads_from.insert(a)
    }

    /// Pending store operands for a node's representative, ascending
    pub fn stores_at(&self, id: NodeId) -> Vec<NodeId> {
        let rep = self.representative(id);
        let mut v: Vec<NodeId> = self
            .slot(rep)
            .map(|n| n.stores_at.iter().copied().collect())
            .unwrap_or_default();
        v.sort_unstable();
        v
    }

    /// Pending load targets for a node's representative, ascending
    pub fn loads_from(&self, id: NodeId) -> Vec<NodeId> {
        let rep = self.representative(id);
        let mut v: Vec<NodeId> = self
            .slot(rep)
            .map(|n| n.loads_from.iter().copied().collect())
            .unwrap_or_default();
        v.sort_unstable();
        v
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Points-to Sets
    // ═══════════════════════════════════════════════════════════════════════

    /// Add `pointee` to the points-to set of `node`'s representative
    ///
    /// Returns true if the set changed.
    pub fn add_points_to(&mut self, node: NodeId, pointee: NodeId) -> bool {
        self.ensure_node(node);
        let rep = self.representative(node);
        let i = self.index_of(rep);
        self.nodes[i].points_to.insert(pointee)
    }

    /// Points-to set of a node's representative, ascending. Empty for unknown
    /// ids. Meaningful after the solver has reached fixpoint; before that it
    /// is the partial accumulation so far.
    pub fn points_to(&self, id: NodeId) -> Vec<NodeId> {
        let rep = self.representative(id);
        let mut v: Vec<NodeId> = self
            .slot(rep)
            .map(|n| n.points_to.iter().copied().collect())
            .unwrap_or_default();
        v.sort_unstable();
        v
    }

    /// Size of a node's points-to set
    #[inline]
    pub fn points_to_len(&self, id: NodeId) -> usize {
        let rep = self.representative(id);
        self.slot(rep).map(|n| n.points_to.len()).unwrap_or(0)
    }

    /// Compare the points-to sets of two nodes (at their representatives)
    pub fn pts_equal(&self, a: NodeId, b: NodeId) -> bool {
        let ra = self.representative(a);
        let rb = self.representative(b);
        if ra == rb {
            return true;
        }
        match (self.slot(ra), self.slot(rb)) {
            (Some(na), Some(nb)) => na.points_to == nb.points_to,
            (Some(na), None) => na.points_to.is_empty(),
            (None, Some(nb)) => nb.points_to.is_empty(),
            (None, None) => true,
        }
    }

    /// Union pts(src) into pts(dst), both at their representatives
    ///
    /// Returns true if dst's set grew.
    pub fn union_points_to(&mut self, src: NodeId, dst: NodeId) -> bool {
        let src = self.representative(src);
        let dst = self.representative(dst);
        if src == dst {
            return false;
        }
        let Some(si) = self.slots.get(&src).copied() else {
            return false;
        };
        let Some(di) = self.slots.get(&dst).copied() else {
            return false;
        };
        if self.nodes[si].points_to.is_empty() {
            return false;
        }
        let incoming: Vec<NodeId> = self.nodes[si].points_to.iter().copied().collect();
        let before = self.nodes[di].points_to.len();
        self.nodes[di].points_to.extend(incoming);
        self.nodes[di].points_to.len() > before
    }

    /// Full snapshot: every id ever introduced mapped to its (representative's)
    /// points-to set, each set ascending
    pub fn all_points_to(&self) -> FxHashMap<NodeId, Vec<NodeId>> {
        self.nodes
            .iter()
            .map(|n| (n.id, self.points_to(n.id)))
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Merging
    // ═══════════════════════════════════════════════════════════════════════

    /// Fold `id` into `target`: redirect all adjacency, union the constraint
    /// tables and the points-to set, deactivate `id`
    ///
    /// Safe under any merge order within a collapse pass: both arguments are
    /// resolved through their current representatives first, and redirected
    /// edges whose far endpoint is `id` itself are remapped to `target` and
    /// then dropped as self-edges.
    pub fn merge(&mut self, id: NodeId, target: NodeId) {
        let id = self.representative(id);
        let target = self.representative(target);
        if id == target || !self.contains(id) || !self.contains(target) {
            return;
        }
        let ii = self.index_of(id);
        let ti = self.index_of(target);

        // Drop the direct edges between the pair in both directions.
        self.nodes[ii].subset_out.remove(&target);
        self.nodes[ii].subset_in.remove(&target);
        self.nodes[ti].subset_out.remove(&id);
        self.nodes[ti].subset_in.remove(&id);

        // Redirect every outgoing edge id -> v to target -> v.
        let outgoing: Vec<NodeId> = self.nodes[ii].subset_out.drain().collect();
        for v in outgoing {
            let v = if v == id { target } else { v };
            if v == target {
                continue;
            }
            let vi = self.index_of(v);
            self.nodes[vi].subset_in.remove(&id);
            self.nodes[vi].subset_in.insert(target);
            self.nodes[ti].subset_out.insert(v);
        }

        // Redirect every incoming edge v -> id to v -> target.
        let incoming: Vec<NodeId> = self.nodes[ii].subset_in.drain().collect();
        for v in incoming {
            let v = if v == id { target } else { v };
            if v == target {
                continue;
            }
            let vi = self.index_of(v);
            self.nodes[vi].subset_out.remove(&id);
            self.nodes[vi].subset_out.insert(target);
            self.nodes[ti].subset_in.insert(v);
        }

        // Union stores, loads and the points-to set into the target.
        let stores: Vec<NodeId> = self.nodes[ii].stores_at.drain().collect();
        self.nodes[ti].stores_at.extend(stores);
        let loads: Vec<NodeId> = self.nodes[ii].loads_from.drain().collect();
        self.nodes[ti].loads_from.extend(loads);
        let pts: Vec<NodeId> = self.nodes[ii].points_to.drain().collect();
        self.nodes[ti].points_to.extend(pts);

        // Deactivate and flatten: id and everything it had absorbed now
        // resolve to target in a single hop.
        self.nodes[ii].live = false;
        self.nodes[ii].representative = target;
        let absorbed = std::mem::take(&mut self.nodes[ii].absorbed);
        for &a in &absorbed {
            let ai = self.index_of(a);
            self.nodes[ai].representative = target;
        }
        self.nodes[ti].absorbed.push(id);
        self.nodes[ti].absorbed.extend(absorbed);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Diagnostics
    // ═══════════════════════════════════════════════════════════════════════

    /// Deterministic textual rendering of the graph state: vertex count,
    /// representative mapping, live-node adjacency and points-to sets
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConstraintGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# of Vertices: {}", self.node_count())?;

        writeln!(f, "Representatives:")?;
        for id in self.all_nodes() {
            writeln!(f, "{} -> {}", id, self.representative(id))?;
        }
        writeln!(f)?;

        writeln!(f, "Connections (Graph):")?;
        for id in self.live_nodes() {
            write!(f, "{} ->", id)?;
            for succ in self.subset_out(id) {
                write!(f, " {}", succ)?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;

        writeln!(f, "Points-to-set:")?;
        for id in self.all_nodes() {
            let pts: Vec<String> = self.points_to(id).iter().map(|p| p.to_string()).collect();
            writeln!(f, "{} -> {{{}}}", id, pts.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotent_node_creation() {
        let mut g = ConstraintGraph::new();
        g.ensure_node(7);
        g.ensure_node(7);
        assert_eq!(g.node_count(), 1);
        assert!(g.is_live(7));
        assert_eq!(g.representative(7), 7);
    }

    #[test]
    fn test_edge_symmetry() {
        let mut g = ConstraintGraph::new();
        assert!(g.add_subset_edge(1, 2));
        assert!(!g.add_subset_edge(1, 2));
        assert_eq!(g.subset_out(1), vec![2]);
        assert_eq!(g.subset_in(2), vec![1]);
    }

    #[test]
    fn test_self_edge_rejected() {
        let mut g = ConstraintGraph::new();
        assert!(!g.add_subset_edge(1, 1));
        assert!(g.subset_out(1).is_empty());
    }

    #[test]
    fn test_merge_moves_all_tables() {
        let mut g = ConstraintGraph::new();
        g.add_subset_edge(1, 2);
        g.add_subset_edge(2, 1);
        g.add_store(2, 5);
        g.add_load(2, 6);
        g.add_points_to(2, 9);

        g.merge(2, 1);

        assert!(!g.is_live(2));
        assert!(g.is_live(1));
        assert_eq!(g.representative(2), 1);
        // Mutual edges between the pair are gone.
        assert!(g.subset_out(1).is_empty());
        assert!(g.subset_in(1).is_empty());
        // Tables reachable through the merged id resolve to the target.
        assert_eq!(g.stores_at(2), vec![5]);
        assert_eq!(g.loads_from(2), vec![6]);
        assert_eq!(g.points_to(2), vec![9]);
        assert_eq!(g.points_to(1), vec![9]);
    }

    #[test]
    fn test_merge_redirects_third_party_edges() {
        let mut g = ConstraintGraph::new();
        g.add_subset_edge(2, 3);
        g.add_subset_edge(4, 2);
        g.ensure_node(1);

        g.merge(2, 1);

        assert_eq!(g.subset_out(1), vec![3]);
        assert_eq!(g.subset_in(3), vec![1]);
        assert_eq!(g.subset_out(4), vec![1]);
        assert_eq!(g.subset_in(1), vec![4]);
    }

    #[test]
    fn test_representative_lookup_is_single_hop() {
        let mut g = ConstraintGraph::new();
        g.ensure_node(1);
        g.ensure_node(2);
        g.ensure_node(3);

        g.merge(2, 1);
        g.merge(1, 3);

        // The id absorbed two merges ago still resolves directly.
        assert_eq!(g.representative(2), 3);
        assert_eq!(g.representative(1), 3);
        assert_eq!(g.representative(3), 3);
    }

    #[test]
    fn test_edges_through_merged_ids_resolve() {
        let mut g = ConstraintGraph::new();
        g.ensure_node(1);
        g.ensure_node(2);
        g.merge(2, 1);

        // Edge registered against a merged id lands on its representative.
        assert!(g.add_subset_edge(2, 3));
        assert_eq!(g.subset_out(1), vec![3]);
        // An edge that resolves to a self-edge is rejected.
        assert!(!g.add_subset_edge(2, 1));
    }

    #[test]
    fn test_all_points_to_covers_merged_ids() {
        let mut g = ConstraintGraph::new();
        g.add_points_to(1, 8);
        g.add_points_to(2, 9);
        g.merge(2, 1);

        let all = g.all_points_to();
        assert_eq!(all[&1], vec![8, 9]);
        assert_eq!(all[&2], vec![8, 9]);
    }

    #[test]
    fn test_dump_is_sorted_and_stable() {
        let mut g = ConstraintGraph::new();
        g.ensure_node(1);
        g.add_points_to(2, 1);
        g.add_subset_edge(2, 3);

        let expected = "\
# of Vertices: 3
Representatives:
1 -> 1
2 -> 2
3 -> 3

Connections (Graph):
1 ->
2 -> 3
3 ->

Points-to-set:
1 -> {}
2 -> {1}
3 -> {}
";
        assert_eq!(g.dump(), expected);
    }
}
