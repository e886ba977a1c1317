//! Points-to Analyzer Facade
//!
//! The application-level entry point: accepts constraints through named
//! methods (or whole [`ConstraintGenerator`] frontends), runs the solver, and
//! answers queries over the solved graph. Keeps the submitted constraint
//! stream for statistics and replay.

use crate::features::points_to::domain::constraint::{Constraint, ConstraintSet, NodeId};
use crate::features::points_to::domain::constraint_graph::ConstraintGraph;
use crate::features::points_to::infrastructure::solver::{
    InclusionSolver, SolveStats, SolverConfig,
};
use crate::features::points_to::ports::{ConstraintGenerator, PointsToQuery};
use rustc_hash::FxHashMap;
use tracing::debug;

/// High-level points-to analysis driver
#[derive(Debug, Default)]
pub struct PointsToAnalyzer {
    solver: InclusionSolver,
    constraints: ConstraintSet,
}

impl PointsToAnalyzer {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            solver: InclusionSolver::new(config),
            constraints: ConstraintSet::new(),
        }
    }

    /// Submit one constraint
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.solver.add_constraint(&constraint);
        self.constraints.add(constraint);
    }

    /// ADDRESS-OF: `a = &b`
    pub fn add_address_of(&mut self, a: NodeId, b: NodeId) {
        self.add_constraint(Constraint::address_of(a, b));
    }

    /// COPY: `a = b`
    pub fn add_base(&mut self, a: NodeId, b: NodeId) {
        self.add_constraint(Constraint::copy(a, b));
    }

    /// STORE: `*a = b`
    pub fn add_store(&mut self, a: NodeId, b: NodeId) {
        self.add_constraint(Constraint::store(a, b));
    }

    /// LOAD: `a = *b`
    pub fn add_load(&mut self, a: NodeId, b: NodeId) {
        self.add_constraint(Constraint::load(a, b));
    }

    /// Submit a batch of constraints
    pub fn add_constraints(&mut self, constraints: impl IntoIterator<Item = Constraint>) {
        for c in constraints {
            self.add_constraint(c);
        }
    }

    /// Submit every constraint a frontend produces
    pub fn add_generated(&mut self, generator: &dyn ConstraintGenerator) {
        let constraints = generator.generate();
        debug!(count = constraints.len(), "ingesting generated constraints");
        self.add_constraints(constraints);
    }

    /// Run the solver to fixpoint; may be called again after adding more
    /// constraints, refining the existing result
    pub fn solve(&mut self) -> SolveStats {
        self.solver.solve()
    }

    /// Points-to set of `node`, ascending by id
    pub fn points_to(&self, node: NodeId) -> Vec<NodeId> {
        self.solver.graph().points_to(node)
    }

    /// Solved sets for every node ever introduced, merged nodes included
    pub fn all_points_to(&self) -> FxHashMap<NodeId, Vec<NodeId>> {
        self.solver.graph().all_points_to()
    }

    /// Representative of `node` after cycle collapsing (itself if unmerged)
    pub fn representative(&self, node: NodeId) -> NodeId {
        self.solver.graph().representative(node)
    }

    /// Human-readable dump of the solved graph: vertex count, representative
    /// table, subset edges and points-to sets, all ascending by id
    pub fn dump(&self) -> String {
        self.solver.graph().dump()
    }

    /// The underlying constraint graph
    pub fn graph(&self) -> &ConstraintGraph {
        self.solver.graph()
    }

    /// Constraints submitted so far, in order
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Solver statistics
    pub fn stats(&self) -> &SolveStats {
        self.solver.stats()
    }
}

impl PointsToQuery for PointsToAnalyzer {
    fn points_to(&self, node: NodeId) -> Vec<NodeId> {
        PointsToAnalyzer::points_to(self, node)
    }
}
