//! Infrastructure layer for Points-to Analysis
//!
//! Algorithm implementations over the domain model:
//! - **cycle_collapse**: online SCC detection in the copy-edge graph and
//!   destructive merging of each component into one representative
//! - **solver**: constraint ingestion plus the worklist fixpoint driver

pub mod cycle_collapse;
pub mod solver;

pub use cycle_collapse::collapse_cycles;
pub use solver::{InclusionSolver, SolveStats, SolverConfig};
