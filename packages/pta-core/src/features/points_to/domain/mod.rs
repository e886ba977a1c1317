//! Domain models for Points-to Analysis
//!
//! Core abstractions independent of the solving algorithm:
//! - Constraint: the four constraint kinds (ADDRESS-OF, COPY, STORE, LOAD)
//! - ConstraintGraph: node store with representatives, subset edges and
//!   points-to sets

pub mod constraint;
pub mod constraint_graph;

pub use constraint::{Constraint, ConstraintKind, ConstraintSet, NodeId};
pub use constraint_graph::ConstraintGraph;
