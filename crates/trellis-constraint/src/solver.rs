//! Adapter over the Cassowary solver collaborator.
//!
//! The engine is consumed as a black box behind this module: constraint
//! specs are lowered to its expression form here, its failures are surfaced
//! unmodified as [`SolverError`], and solved deltas are accumulated so the
//! solve and apply steps of the layout cycle can stay separate.

use std::collections::HashMap;

use cassowary::WeightedRelation::{EQ, GE, LE};
use cassowary::{strength, AddConstraintError, RemoveConstraintError};
use trellis_core::{SolverError, Strength};

use crate::expr::{ConstraintSpec, Expr, Relation};

/// Raw solver variable handle.
pub(crate) type RawVariable = cassowary::Variable;

/// Handle to a constraint held by the solver.
#[derive(Clone)]
pub struct ConstraintHandle(cassowary::Constraint);

impl std::fmt::Debug for ConstraintHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConstraintHandle")
    }
}

/// The incremental linear-arithmetic solver.
///
/// Constraints are solved as they are added, so an unsatisfiable required
/// set fails at submission time, and `refresh` only collects the resulting
/// variable deltas.
pub struct Solver {
    inner: cassowary::Solver,
    pending: HashMap<RawVariable, f64>,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Self {
            inner: cassowary::Solver::new(),
            pending: HashMap::new(),
        }
    }

    /// Mint a fresh raw variable handle.
    pub(crate) fn mint_raw() -> RawVariable {
        cassowary::Variable::new()
    }

    /// Lower and add a constraint at the given effective weight.
    ///
    /// `weight` is the numeric strength actually handed to the solver; the
    /// registrar derives it from the spec's strength tier and its tie-break
    /// policy.
    pub(crate) fn add_spec(
        &mut self,
        spec: &ConstraintSpec,
        weight: f64,
    ) -> Result<ConstraintHandle, SolverError> {
        let lhs = lower_expr(&spec.lhs);
        let rhs = lower_expr(&spec.rhs);
        let relation = match spec.relation {
            Relation::Eq => EQ(weight),
            Relation::Le => LE(weight),
            Relation::Ge => GE(weight),
        };
        let constraint = lhs | relation | rhs;
        self.inner
            .add_constraint(constraint.clone())
            .map_err(|error| match error {
                AddConstraintError::UnsatisfiableConstraint => SolverError::Unsatisfiable {
                    constraint: spec.to_string(),
                },
                AddConstraintError::DuplicateConstraint => SolverError::DuplicateConstraint {
                    constraint: spec.to_string(),
                },
                AddConstraintError::InternalSolverError(reason) => SolverError::Internal {
                    reason: reason.to_string(),
                },
            })?;
        Ok(ConstraintHandle(constraint))
    }

    /// Remove a constraint from the solver.
    pub(crate) fn remove(&mut self, handle: &ConstraintHandle) -> Result<(), SolverError> {
        self.inner
            .remove_constraint(&handle.0)
            .map_err(|error| match error {
                RemoveConstraintError::UnknownConstraint => SolverError::UnknownConstraint,
                RemoveConstraintError::InternalSolverError(reason) => SolverError::Internal {
                    reason: reason.to_string(),
                },
            })
    }

    /// Whether the solver still holds the constraint.
    pub(crate) fn holds(&self, handle: &ConstraintHandle) -> bool {
        self.inner.has_constraint(&handle.0)
    }

    /// Pull the solver's variable deltas into the pending snapshot without
    /// publishing them anywhere.
    pub fn refresh(&mut self) {
        for &(variable, value) in self.inner.fetch_changes() {
            self.pending.insert(variable, value);
        }
    }

    /// Refresh and drain the accumulated deltas for the apply step.
    pub(crate) fn take_changes(&mut self) -> Vec<(RawVariable, f64)> {
        self.refresh();
        self.pending.drain().collect()
    }
}

/// Numeric strength for a tier.
pub(crate) fn strength_value(tier: Strength) -> f64 {
    match tier {
        Strength::Required => strength::REQUIRED,
        Strength::Strong => strength::STRONG,
        Strength::Medium => strength::MEDIUM,
        Strength::Weak => strength::WEAK,
    }
}

fn lower_expr(expr: &Expr) -> cassowary::Expression {
    let mut lowered = cassowary::Expression::from_constant(expr.constant_part());
    for term in expr.terms() {
        lowered = lowered + term.variable.raw() * term.coefficient;
    }
    lowered
}
