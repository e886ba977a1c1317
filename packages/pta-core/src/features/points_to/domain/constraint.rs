//! Points-to Analysis Constraints
//!
//! Four constraint kinds following Andersen's formulation, as produced by an
//! external constraint generator from the program representation:
//! - ADDRESS-OF: a = &b
//! - COPY:       a = b
//! - STORE:      *a = b
//! - LOAD:       a = *b
//!
//! Note the address-of registration direction: `a = &b` records `a` in the
//! points-to set of `b`, i.e. the address-taken node accumulates the ids of
//! the nodes that point at it. This is the analysis's fixed contract and the
//! worklist propagation rules are written consistently with it.

use serde::{Deserialize, Serialize};

/// Identifier of an abstract memory location (a variable, field or allocation
/// site in the analyzed program). Supplied by the constraint generator; not
/// required to be contiguous.
pub type NodeId = u32;

/// Constraint kinds for points-to analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Address-of constraint: a = &b
    /// Registers `a` in the points-to set of `b`.
    AddressOf,

    /// Copy constraint: a = b
    /// Subset edge b -> a: pts(a) ⊇ pts(b)
    Copy,

    /// Store constraint: *a = b
    /// For every v ∈ pts(a), pts(v) ⊇ pts(b) once propagated
    Store,

    /// Load constraint: a = *b
    /// For every v ∈ pts(b), pts(a) ⊇ pts(v) once propagated
    Load,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::AddressOf => "ADDRESS-OF",
            ConstraintKind::Copy => "COPY",
            ConstraintKind::Store => "STORE",
            ConstraintKind::Load => "LOAD",
        }
    }
}

/// A single constraint over two node identifiers
///
/// Any pair of ids is accepted as valid operands; missing nodes are created
/// on first use and repeated submission of the same constraint is a no-op at
/// the graph level (set semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint kind
    pub kind: ConstraintKind,

    /// First operand (the assigned side in the source form)
    pub lhs: NodeId,

    /// Second operand
    pub rhs: NodeId,
}

impl Constraint {
    /// Create an ADDRESS-OF constraint: a = &b
    #[inline]
    pub fn address_of(a: NodeId, b: NodeId) -> Self {
        Self {
            kind: ConstraintKind::AddressOf,
            lhs: a,
            rhs: b,
        }
    }

    /// Create a COPY constraint: a = b
    #[inline]
    pub fn copy(a: NodeId, b: NodeId) -> Self {
        Self {
            kind: ConstraintKind::Copy,
            lhs: a,
            rhs: b,
        }
    }

    /// Create a STORE constraint: *a = b
    #[inline]
    pub fn store(a: NodeId, b: NodeId) -> Self {
        Self {
            kind: ConstraintKind::Store,
            lhs: a,
            rhs: b,
        }
    }

    /// Create a LOAD constraint: a = *b
    #[inline]
    pub fn load(a: NodeId, b: NodeId) -> Self {
        Self {
            kind: ConstraintKind::Load,
            lhs: a,
            rhs: b,
        }
    }

    /// Check if this is a complex constraint (STORE or LOAD), i.e. one whose
    /// effect depends on a points-to set computed during solving
    #[inline]
    pub fn is_complex(&self) -> bool {
        matches!(self.kind, ConstraintKind::Store | ConstraintKind::Load)
    }
}

/// Constraint stream with per-kind statistics
#[derive(Debug, Default)]
pub struct ConstraintSet {
    /// All constraints in submission order
    pub constraints: Vec<Constraint>,

    /// Statistics
    pub address_of_count: usize,
    pub copy_count: usize,
    pub store_count: usize,
    pub load_count: usize,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            constraints: Vec::with_capacity(capacity),
            ..Default::default()
        }
    }

    /// Record a constraint and update statistics
    pub fn add(&mut self, constraint: Constraint) {
        match constraint.kind {
            ConstraintKind::AddressOf => self.address_of_count += 1,
            ConstraintKind::Copy => self.copy_count += 1,
            ConstraintKind::Store => self.store_count += 1,
            ConstraintKind::Load => self.load_count += 1,
        }
        self.constraints.push(constraint);
    }

    /// Total number of constraints recorded
    #[inline]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iterate over constraints
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Get constraints by kind
    pub fn by_kind(&self, kind: ConstraintKind) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.kind == kind)
    }

    /// Get complex constraints (STORE + LOAD)
    pub fn complex(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.is_complex())
    }
}
