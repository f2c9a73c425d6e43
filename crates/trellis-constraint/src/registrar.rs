//! Constraint registrar: tracked submission, removal, and compaction.
//!
//! Every constraint the engine creates goes through a registrar, which
//! validates referenced variables, applies the strength policy, and keeps
//! the handle so the constraint can be removed later.
//!
//! Same-strength tie-break policy: first registered wins. Within each
//! non-required tier, every submission is weighted by a monotonically
//! decaying factor, so when two constraints of equal tier conflict, the
//! earlier one is honored. The decay never crosses tier boundaries and is
//! never applied to required constraints.

use indexmap::IndexMap;

use trellis_core::{ConfigError, LayoutError, Strength};

use crate::expr::ConstraintSpec;
use crate::solver::{strength_value, ConstraintHandle, Solver};
use crate::variable::VariableSpace;

/// Registrar-scoped id of a tracked constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(u64);

/// Snapshot of the registrar's tracked length, for rollback.
#[derive(Debug, Clone, Copy)]
pub struct RegistrarMark(usize);

struct Tracked {
    spec: ConstraintSpec,
    handle: ConstraintHandle,
}

/// Tracks every constraint submitted to the solver.
#[derive(Default)]
pub struct ConstraintRegistrar {
    tracked: IndexMap<ConstraintId, Tracked>,
    next_id: u64,
    submissions: u64,
}

impl ConstraintRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and submit a constraint.
    ///
    /// Fails with [`ConfigError::UnknownVariable`] before touching the
    /// solver if any referenced variable was not minted by `space`; solver
    /// unsatisfiability is surfaced unmodified.
    pub fn submit(
        &mut self,
        solver: &mut Solver,
        space: &VariableSpace,
        spec: ConstraintSpec,
    ) -> Result<ConstraintId, LayoutError> {
        for variable in spec.variables() {
            if !space.is_registered(variable) {
                return Err(ConfigError::UnknownVariable {
                    name: variable.name().to_string(),
                }
                .into());
            }
        }

        let weight = self.effective_weight(spec.strength);
        let handle = solver.add_spec(&spec, weight)?;
        self.submissions += 1;

        let id = ConstraintId(self.next_id);
        self.next_id += 1;
        self.tracked.insert(id, Tracked { spec, handle });
        Ok(id)
    }

    /// Remove one tracked constraint from the solver.
    pub fn remove(&mut self, solver: &mut Solver, id: ConstraintId) -> Result<(), LayoutError> {
        match self.tracked.shift_remove(&id) {
            Some(tracked) => Ok(solver.remove(&tracked.handle)?),
            None => Err(trellis_core::SolverError::UnknownConstraint.into()),
        }
    }

    /// Remove and unregister every tracked constraint. Idempotent: clearing
    /// an empty registrar is a no-op.
    pub fn clear(&mut self, solver: &mut Solver) {
        for (_, tracked) in self.tracked.drain(..) {
            // The solver may have dropped the constraint already.
            let _ = solver.remove(&tracked.handle);
        }
    }

    /// Drop references to constraints the solver no longer holds.
    pub fn compact(&mut self, solver: &Solver) {
        self.tracked.retain(|_, tracked| solver.holds(&tracked.handle));
    }

    /// Snapshot the current tracked length.
    pub fn mark(&self) -> RegistrarMark {
        RegistrarMark(self.tracked.len())
    }

    /// Remove everything submitted after `mark`, newest first.
    pub fn rollback_to(&mut self, solver: &mut Solver, mark: RegistrarMark) {
        while self.tracked.len() > mark.0 {
            if let Some((_, tracked)) = self.tracked.pop() {
                let _ = solver.remove(&tracked.handle);
            }
        }
    }

    /// The spec of a tracked constraint.
    pub fn get(&self, id: ConstraintId) -> Option<&ConstraintSpec> {
        self.tracked.get(&id).map(|tracked| &tracked.spec)
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    fn effective_weight(&self, tier: Strength) -> f64 {
        let base = strength_value(tier);
        if tier.is_required() {
            return base;
        }
        // Monotone within-tier decay. The step stays above the solver's
        // internal pivoting tolerance even at the weak tier, and the floor
        // keeps pathological submission counts inside the tier (tiers are
        // three orders of magnitude apart).
        let factor = (1.0 - self.submissions as f64 * 1e-6).max(0.9);
        base * factor
    }
}
