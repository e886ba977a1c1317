/*
 * pta-core - Inclusion-based points-to analysis engine
 *
 * Feature-First Hexagonal Architecture:
 * - features/points_to/domain/         : constraint model + constraint graph (node store)
 * - features/points_to/infrastructure/ : cycle collapsing + worklist fixpoint solver
 * - features/points_to/application/    : high-level analyzer facade
 * - features/points_to/ports/          : trait seams for external collaborators
 */

/// Feature modules
pub mod features;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use features::points_to::application::analyzer::PointsToAnalyzer;
pub use features::points_to::domain::constraint::{
    Constraint, ConstraintKind, ConstraintSet, NodeId,
};
pub use features::points_to::domain::constraint_graph::ConstraintGraph;
pub use features::points_to::infrastructure::solver::{InclusionSolver, SolveStats, SolverConfig};
pub use features::points_to::ports::{ConstraintGenerator, PointsToQuery};
