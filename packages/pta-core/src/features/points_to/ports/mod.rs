//! Ports for Points-to Analysis
//!
//! Trait seams between the analysis engine and its collaborators: a frontend
//! that lowers some program representation into constraints, and consumers
//! that read the solved sets.

use crate::features::points_to::domain::constraint::{Constraint, NodeId};

/// Produces the constraint stream for one unit of analyzed code
///
/// Implementations walk a program representation (an IR, an AST, bytecode)
/// and emit one constraint per pointer-relevant assignment. Node ids are
/// chosen by the generator and only need to be stable within one run.
pub trait ConstraintGenerator: Send + Sync {
    /// Emit all constraints for the unit
    fn generate(&self) -> Vec<Constraint>;
}

/// Read access to solved points-to results
pub trait PointsToQuery: Send + Sync {
    /// Points-to set of a node, ascending by id; empty for unknown nodes
    fn points_to(&self, node: NodeId) -> Vec<NodeId>;

    /// Whether `pointer` may point to `pointee`
    fn may_point_to(&self, pointer: NodeId, pointee: NodeId) -> bool {
        self.points_to(pointer).binary_search(&pointee).is_ok()
    }

    /// Whether two nodes may alias (their points-to sets intersect)
    fn may_alias(&self, a: NodeId, b: NodeId) -> bool {
        let pa = self.points_to(a);
        let pb = self.points_to(b);
        // Both sorted ascending; linear merge intersection test.
        let (mut i, mut j) = (0, 0);
        while i < pa.len() && j < pb.len() {
            match pa[i].cmp(&pb[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedQuery;

    impl PointsToQuery for FixedQuery {
        fn points_to(&self, node: NodeId) -> Vec<NodeId> {
            match node {
                1 => vec![10, 20, 30],
                2 => vec![20],
                3 => vec![40],
                _ => vec![],
            }
        }
    }

    #[test]
    fn test_may_point_to() {
        let q = FixedQuery;
        assert!(q.may_point_to(1, 20));
        assert!(!q.may_point_to(2, 10));
        assert!(!q.may_point_to(99, 10));
    }

    #[test]
    fn test_may_alias() {
        let q = FixedQuery;
        assert!(q.may_alias(1, 2));
        assert!(!q.may_alias(2, 3));
        assert!(!q.may_alias(3, 99));
    }
}
