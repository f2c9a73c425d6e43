//! Hint registrations and hint variables.
//!
//! Every user-authored layout relation is recorded as a named, append-only
//! registration owning the constraints it produced and any free-standing
//! hint variables it minted. Hints are never deleted; they live as long as
//! their `LayoutContext`.

use std::collections::HashMap;

use indexmap::IndexMap;
use trellis_core::{HintId, LayoutError};
use trellis_constraint::{
    ConstraintId, ConstraintRegistrar, ConstraintSpec, Solver, VarRole, Variable, VariableSpace,
};

/// One registered hint: its id and everything it owns.
pub struct HintRegistration {
    id: HintId,
    label: String,
    sequence: u64,
    variables: Vec<Variable>,
    constraints: Vec<ConstraintId>,
}

impl HintRegistration {
    pub fn id(&self) -> &HintId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Hint variables owned by this registration.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Constraints compiled from this hint.
    pub fn constraints(&self) -> &[ConstraintId] {
        &self.constraints
    }
}

/// Render-order record produced by an enclosure: the container is drawn
/// beneath the children it encloses.
#[derive(Debug, Clone)]
pub struct Enclosure {
    pub container: String,
    pub children: Vec<String>,
}

/// Append-only registry of hints.
#[derive(Default)]
pub struct HintRegistry {
    registrations: IndexMap<HintId, HintRegistration>,
    sequences: HashMap<String, u64>,
    enclosures: Vec<Enclosure>,
}

impl HintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next sequence for `label`.
    pub(crate) fn reserve(&mut self, label: &str) -> u64 {
        let counter = self.sequences.entry(label.to_string()).or_insert(0);
        let sequence = *counter;
        *counter += 1;
        sequence
    }

    /// Give back a reserved sequence after a failed registration.
    pub(crate) fn release(&mut self, label: &str, sequence: u64) {
        if let Some(counter) = self.sequences.get_mut(label) {
            if *counter == sequence + 1 {
                *counter = sequence;
            }
        }
    }

    pub(crate) fn insert(&mut self, registration: HintRegistration) {
        self.registrations
            .insert(registration.id.clone(), registration);
    }

    pub(crate) fn append_constraint(&mut self, id: &HintId, constraint: ConstraintId) {
        if let Some(registration) = self.registrations.get_mut(id) {
            registration.constraints.push(constraint);
        }
    }

    pub(crate) fn record_enclosure(&mut self, container: String, children: Vec<String>) {
        self.enclosures.push(Enclosure {
            container,
            children,
        });
    }

    /// Look up one registration.
    pub fn get(&self, id: &HintId) -> Option<&HintRegistration> {
        self.registrations.get(id)
    }

    /// Registered hint ids, in registration order.
    pub fn list(&self) -> impl Iterator<Item = &HintId> {
        self.registrations.keys()
    }

    /// All registrations, in registration order.
    pub fn registrations(&self) -> impl Iterator<Item = &HintRegistration> {
        self.registrations.values()
    }

    /// Enclosure render-order records, in registration order.
    pub fn enclosures(&self) -> &[Enclosure] {
        &self.enclosures
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

/// Scope handed to a hint builder closure.
///
/// Everything minted or submitted through the scope is recorded into the
/// hint registration under construction.
pub struct HintScope<'a> {
    pub(crate) id: HintId,
    pub(crate) base: String,
    pub(crate) solver: &'a mut Solver,
    pub(crate) space: &'a mut VariableSpace,
    pub(crate) registrar: &'a mut ConstraintRegistrar,
    pub(crate) variables: Vec<Variable>,
    pub(crate) constraints: Vec<ConstraintId>,
}

impl HintScope<'_> {
    /// The id assigned to this registration. The builder must return it.
    pub fn id(&self) -> &HintId {
        &self.id
    }

    /// Mint a hint variable named `hint:<base>` or `hint:<base>_<name>`.
    pub fn hint_variable(&mut self, name: Option<&str>) -> Result<Variable, LayoutError> {
        let full = match name {
            Some(name) => format!("hint:{}_{}", self.base, name),
            None => format!("hint:{}", self.base),
        };
        let variable = self.space.create_variable(&full, VarRole::Hint)?;
        self.variables.push(variable.clone());
        Ok(variable)
    }

    /// Submit a constraint owned by this hint.
    pub fn submit(&mut self, spec: ConstraintSpec) -> Result<ConstraintId, LayoutError> {
        let id = self.registrar.submit(self.solver, self.space, spec)?;
        self.constraints.push(id);
        Ok(id)
    }
}

pub(crate) fn registration_parts(
    id: HintId,
    label: &str,
    sequence: u64,
    variables: Vec<Variable>,
    constraints: Vec<ConstraintId>,
) -> HintRegistration {
    HintRegistration {
        id,
        label: label.to_string(),
        sequence,
        variables,
        constraints,
    }
}
