//! Inclusion-Based Worklist Solver
//!
//! Translates the four constraint kinds into constraint-graph mutations and
//! drives the monotone fixpoint:
//! 1. For every pointee `v` of the current node, introduce the subset edges
//!    demanded by the node's pending load (`v -> a`) and store (`b -> v`)
//!    constraints, marking the edge source for re-processing.
//! 2. Propagate the node's points-to set along its outgoing subset edges.
//!    When a successor's set is already identical and the edge has not yet
//!    triggered a collapse, the two nodes sit on a redundant copy cycle and a
//!    collapse pass is run over the whole live graph.
//! 3. When the current work queue drains, the newly marked nodes become the
//!    next batch; the fixpoint is reached when no node is marked.
//!
//! Points-to sets only ever grow and are bounded by the node count, so the
//! fixpoint terminates. Node processing order does not affect the final sets
//! (the propagation rules are confluent); batches are sorted by id so a given
//! constraint stream replays identically.

use super::cycle_collapse::collapse_cycles;
use crate::features::points_to::domain::constraint::{Constraint, ConstraintKind, NodeId};
use crate::features::points_to::domain::constraint_graph::ConstraintGraph;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, warn};

/// Solver configuration
///
/// Explicit per-instance configuration; the solver keeps no process-wide
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Collapse copy cycles online during solving. Disabling this changes
    /// performance on cyclic inputs, never results.
    pub enable_cycle_collapse: bool,

    /// Maximum worklist iterations (0 = unbounded). A safety valve for
    /// pathological inputs: hitting it logs a warning and stops with the
    /// current (sound but possibly not yet fixed) sets.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            enable_cycle_collapse: true,
            max_iterations: 0,
        }
    }
}

/// Solver statistics
///
/// Constraint counts accumulate over the solver's lifetime; the remaining
/// fields describe the most recent [`InclusionSolver::solve`] run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolveStats {
    pub address_of_count: usize,
    pub copy_count: usize,
    pub store_count: usize,
    pub load_count: usize,
    pub iterations: usize,
    pub propagations: usize,
    pub collapse_passes: usize,
    pub merged_nodes: usize,
    pub duration_ms: f64,
}

/// The inclusion-based solver: owns the constraint graph and runs the
/// worklist fixpoint over it
#[derive(Debug, Default)]
pub struct InclusionSolver {
    config: SolverConfig,
    graph: ConstraintGraph,
    /// Subset edges (as representative pairs) that already triggered a
    /// collapse pass; bounds how often the idempotent pass re-runs.
    collapsed_edges: FxHashSet<(NodeId, NodeId)>,
    stats: SolveStats,
}

impl InclusionSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// The underlying constraint graph
    pub fn graph(&self) -> &ConstraintGraph {
        &self.graph
    }

    /// Consume the solver, keeping the graph
    pub fn into_graph(self) -> ConstraintGraph {
        self.graph
    }

    /// Statistics accumulated so far
    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Apply one constraint to the graph (idempotent per operand pair)
    ///
    /// - ADDRESS-OF `a = &b`: inserts `a` into pts(b)
    /// - COPY `a = b`: subset edge b -> a
    /// - STORE `*a = b`: records b in the store table of a
    /// - LOAD `a = *b`: records a in the load table of b
    pub fn add_constraint(&mut self, constraint: &Constraint) {
        let Constraint { kind, lhs, rhs } = *constraint;
        match kind {
            ConstraintKind::AddressOf => {
                self.graph.ensure_node(lhs);
                self.graph.ensure_node(rhs);
                self.graph.add_points_to(rhs, lhs);
                self.stats.address_of_count += 1;
            }
            ConstraintKind::Copy => {
                self.graph.add_subset_edge(rhs, lhs);
                self.stats.copy_count += 1;
            }
            ConstraintKind::Store => {
                self.graph.add_store(lhs, rhs);
                self.stats.store_count += 1;
            }
            ConstraintKind::Load => {
                self.graph.add_load(rhs, lhs);
                self.stats.load_count += 1;
            }
        }
    }

    /// Run the worklist fixpoint to completion
    ///
    /// Idempotent once converged; may be called again after further
    /// constraints have been added (the sets only grow).
    pub fn solve(&mut self) -> SolveStats {
        let start = Instant::now();
        self.stats.iterations = 0;
        self.stats.propagations = 0;
        self.stats.collapse_passes = 0;
        self.stats.merged_nodes = 0;
        let mut work: VecDeque<NodeId> = self.graph.live_nodes().into();
        let mut marked: FxHashSet<NodeId> = FxHashSet::default();

        debug!(nodes = work.len(), "starting worklist fixpoint");

        loop {
            let Some(node) = work.pop_front() else {
                if marked.is_empty() {
                    break;
                }
                let mut batch: Vec<NodeId> = marked.drain().collect();
                batch.sort_unstable();
                work.extend(batch);
                continue;
            };

            self.stats.iterations += 1;
            if self.config.max_iterations != 0 && self.stats.iterations > self.config.max_iterations
            {
                warn!(
                    limit = self.config.max_iterations,
                    "iteration limit reached before fixpoint"
                );
                break;
            }

            // A node pulled from the queue may have been merged away by a
            // collapse pass since it was marked.
            let node = self.graph.representative(node);
            if !self.graph.is_live(node) {
                continue;
            }

            self.introduce_complex_edges(node, &mut marked);
            self.propagate_along_edges(node, &mut marked);
        }

        self.stats.duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            iterations = self.stats.iterations,
            propagations = self.stats.propagations,
            collapse_passes = self.stats.collapse_passes,
            "fixpoint reached"
        );
        self.stats.clone()
    }

    /// Step 1: realize pending load/store constraints of `node` against its
    /// current points-to set as new subset edges
    fn introduce_complex_edges(&mut self, node: NodeId, marked: &mut FxHashSet<NodeId>) {
        let pts = self.graph.points_to(node);
        if pts.is_empty() {
            return;
        }
        let loads = self.graph.loads_from(node);
        let stores = self.graph.stores_at(node);

        for &v in &pts {
            // a = *node: every pointee v must flow into a.
            for &a in &loads {
                if self.graph.add_subset_edge(v, a) {
                    marked.insert(self.graph.representative(v));
                }
            }
            // *node = b: b must flow into every pointee v.
            for &b in &stores {
                if self.graph.add_subset_edge(b, v) {
                    marked.insert(self.graph.representative(b));
                }
            }
        }
    }

    /// Step 2: union `node`'s points-to set into each subset successor,
    /// collapsing cycles when a successor's set is already identical
    fn propagate_along_edges(&mut self, node: NodeId, marked: &mut FxHashSet<NodeId>) {
        for succ in self.graph.subset_out(node) {
            let n = self.graph.representative(node);
            let z = self.graph.representative(succ);
            if n == z {
                continue;
            }

            if self.config.enable_cycle_collapse
                && self.graph.pts_equal(n, z)
                && self.collapsed_edges.insert((n, z))
            {
                let merged = collapse_cycles(&mut self.graph);
                self.stats.collapse_passes += 1;
                self.stats.merged_nodes += merged;
            }

            // The pass may have merged either endpoint; re-resolve.
            let n = self.graph.representative(n);
            let z = self.graph.representative(z);
            if n == z {
                continue;
            }
            if self.graph.union_points_to(n, z) {
                self.stats.propagations += 1;
                marked.insert(z);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver_with(constraints: &[Constraint]) -> InclusionSolver {
        let mut solver = InclusionSolver::default();
        for c in constraints {
            solver.add_constraint(c);
        }
        solver
    }

    #[test]
    fn test_address_of_seeds_pointee_set() {
        let mut solver = solver_with(&[Constraint::address_of(1, 2)]);
        solver.solve();
        assert_eq!(solver.graph().points_to(2), vec![1]);
        assert!(solver.graph().points_to(1).is_empty());
    }

    #[test]
    fn test_copy_propagates_along_edge() {
        let mut solver = solver_with(&[
            Constraint::address_of(1, 2), // pts(2) = {1}
            Constraint::copy(3, 2),       // edge 2 -> 3
        ]);
        solver.solve();
        assert_eq!(solver.graph().points_to(3), vec![1]);
    }

    #[test]
    fn test_store_introduces_edge_into_pointees() {
        let mut solver = solver_with(&[
            Constraint::address_of(1, 3), // pts(3) = {1}
            Constraint::store(3, 2),      // *3 = 2
        ]);
        solver.solve();
        // Processing node 3 realizes the store as edge 2 -> 1.
        assert!(solver.graph().has_subset_edge(2, 1));
    }

    #[test]
    fn test_load_introduces_edge_from_pointees() {
        let mut solver = solver_with(&[
            Constraint::address_of(5, 1), // pts(1) = {5}
            Constraint::load(4, 1),       // 4 = *1
        ]);
        solver.solve();
        assert!(solver.graph().has_subset_edge(5, 4));
    }

    #[test]
    fn test_constraint_application_is_idempotent() {
        let c = Constraint::copy(2, 1);
        let mut solver = solver_with(&[c, c, c]);
        assert_eq!(solver.stats().copy_count, 3);
        assert_eq!(solver.graph().subset_out(1), vec![2]);
        solver.solve();
        assert_eq!(solver.graph().subset_out(1), vec![2]);
    }

    #[test]
    fn test_copy_cycle_is_collapsed_during_solve() {
        let mut solver = solver_with(&[
            Constraint::address_of(9, 1),
            Constraint::copy(2, 1),
            Constraint::copy(3, 2),
            Constraint::copy(1, 3),
        ]);
        let stats = solver.solve();

        let g = solver.graph();
        let rep = g.representative(1);
        assert_eq!(g.representative(2), rep);
        assert_eq!(g.representative(3), rep);
        assert_eq!(g.points_to(1), vec![9]);
        assert_eq!(g.points_to(2), vec![9]);
        assert_eq!(g.points_to(3), vec![9]);
        assert!(stats.collapse_passes >= 1);
        assert!(stats.merged_nodes >= 2);
    }

    #[test]
    fn test_collapse_disabled_still_converges() {
        let config = SolverConfig {
            enable_cycle_collapse: false,
            ..Default::default()
        };
        let mut solver = InclusionSolver::new(config);
        solver.add_constraint(&Constraint::address_of(9, 1));
        solver.add_constraint(&Constraint::copy(2, 1));
        solver.add_constraint(&Constraint::copy(3, 2));
        solver.add_constraint(&Constraint::copy(1, 3));
        let stats = solver.solve();

        let g = solver.graph();
        assert_eq!(stats.collapse_passes, 0);
        assert_eq!(g.live_count(), 4);
        assert_eq!(g.points_to(1), vec![9]);
        assert_eq!(g.points_to(2), vec![9]);
        assert_eq!(g.points_to(3), vec![9]);
    }

    #[test]
    fn test_iteration_limit_stops_early() {
        let config = SolverConfig {
            max_iterations: 1,
            ..Default::default()
        };
        let mut solver = InclusionSolver::new(config);
        for i in 0..10u32 {
            solver.add_constraint(&Constraint::copy(i + 1, i));
        }
        let stats = solver.solve();
        assert_eq!(stats.iterations, 2); // one processed, one over the limit
    }

    #[test]
    fn test_resolve_after_merge_mid_run() {
        // Two-node copy cycle plus a store hanging off one member: the store
        // table must survive the merge and keep driving edge introduction.
        let mut solver = solver_with(&[
            Constraint::address_of(7, 1), // pts(1) = {7}
            Constraint::copy(2, 1),
            Constraint::copy(1, 2),
            Constraint::store(2, 5), // *2 = 5
        ]);
        solver.solve();

        let g = solver.graph();
        assert_eq!(g.representative(2), g.representative(1));
        // pts(cycle) = {7}, so the store realizes edge 5 -> 7.
        assert!(g.has_subset_edge(5, 7));
    }
}
