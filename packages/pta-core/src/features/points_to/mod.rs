//! # Points-to Analysis
//!
//! Inclusion-based (Andersen-style) pointer analysis over a stream of abstract
//! assignment constraints:
//! - **Constraint graph**: one node per abstract memory location, subset edges
//!   for copy constraints, side tables for store/load constraints
//! - **Worklist solver**: monotone fixpoint over the node set
//! - **Online cycle collapsing**: pointer-equivalent nodes detected during
//!   solving are merged into a single representative, keeping the graph small
//!
//! The analysis is flow- and context-insensitive: one node per location, no
//! call-site or path sensitivity. Constraint *generation* from a program
//! representation is the caller's job (see [`ports::ConstraintGenerator`]).
//!
//! ## References
//! - Andersen, L. O. "Program Analysis and Specialization for C" (PhD 1994)
//! - Nuutila, E. "On Finding the Strongly Connected Components" (1994)
//!
//! ## Usage
//! ```
//! use pta_core::PointsToAnalyzer;
//!
//! let mut analyzer = PointsToAnalyzer::default();
//! analyzer.add_address_of(1, 2); // node1 = &node2
//! analyzer.add_base(3, 2);       // node3 = node2
//! analyzer.solve();
//! assert_eq!(analyzer.points_to(3), vec![1]);
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-exports for public API
pub use application::analyzer::PointsToAnalyzer;
pub use domain::constraint::{Constraint, ConstraintKind, ConstraintSet, NodeId};
pub use domain::constraint_graph::ConstraintGraph;
pub use infrastructure::solver::{InclusionSolver, SolveStats, SolverConfig};
