//! Named solver variables and the rectangle `Bounds` aggregate.
//!
//! Every variable is minted by a [`VariableSpace`], which enforces globally
//! unique dotted-path names, owns the cached solved value for each variable,
//! and composes variables into [`Bounds`] groups with their required
//! rectangle invariants.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use trellis_core::{AlignAttr, BoundsKind, ConfigError, LayoutError};

use crate::expr::{eq, ge0};
use crate::registrar::ConstraintRegistrar;
use crate::solver::{RawVariable, Solver};

/// Role a variable plays in the layout model, assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarRole {
    /// Horizontal anchor (x).
    AnchorX,
    /// Vertical anchor (y).
    AnchorY,
    /// A width or height.
    Extent,
    /// Derived rectangle attribute (right, bottom, centers).
    Derived,
    /// Free-standing hint variable, not tied to any symbol.
    Hint,
}

/// A named scalar variable.
///
/// Handles are cheap to clone; equality and hashing go by the underlying
/// solver handle, so two handles to the same variable compare equal.
#[derive(Debug, Clone)]
pub struct Variable {
    name: Arc<str>,
    role: VarRole,
    raw: RawVariable,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> VarRole {
        self.role
    }

    pub(crate) fn raw(&self) -> RawVariable {
        self.raw
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Mints uniquely-named variables and caches their solved values.
#[derive(Default)]
pub struct VariableSpace {
    entries: IndexMap<Arc<str>, Variable>,
    names: HashMap<RawVariable, Arc<str>>,
    values: HashMap<RawVariable, f64>,
}

impl VariableSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new variable.
    ///
    /// Fails with [`ConfigError::DuplicateVariable`] if the name is taken.
    pub fn create_variable(&mut self, name: &str, role: VarRole) -> Result<Variable, ConfigError> {
        if self.entries.contains_key(name) {
            return Err(ConfigError::DuplicateVariable {
                name: name.to_string(),
            });
        }
        let name: Arc<str> = Arc::from(name);
        let variable = Variable {
            name: name.clone(),
            role,
            raw: Solver::mint_raw(),
        };
        self.names.insert(variable.raw, name.clone());
        self.entries.insert(name, variable.clone());
        Ok(variable)
    }

    /// Create the four primitive and four derived variables of a rectangle
    /// under `prefix`, submitting the required invariant constraints.
    pub fn create_bounds(
        &mut self,
        solver: &mut Solver,
        registrar: &mut ConstraintRegistrar,
        prefix: &str,
        kind: BoundsKind,
    ) -> Result<Bounds, LayoutError> {
        let x = self.create_variable(&format!("{}.x", prefix), VarRole::AnchorX)?;
        let y = self.create_variable(&format!("{}.y", prefix), VarRole::AnchorY)?;
        let width = self.create_variable(&format!("{}.width", prefix), VarRole::Extent)?;
        let height = self.create_variable(&format!("{}.height", prefix), VarRole::Extent)?;
        let right = self.create_variable(&format!("{}.right", prefix), VarRole::Derived)?;
        let bottom = self.create_variable(&format!("{}.bottom", prefix), VarRole::Derived)?;
        let center_x = self.create_variable(&format!("{}.center_x", prefix), VarRole::Derived)?;
        let center_y = self.create_variable(&format!("{}.center_y", prefix), VarRole::Derived)?;

        let bounds = Bounds {
            name: prefix.to_string(),
            kind,
            x,
            y,
            width,
            height,
            right,
            bottom,
            center_x,
            center_y,
        };

        registrar.submit(solver, self, eq(bounds.right(), bounds.x() + bounds.width()))?;
        registrar.submit(
            solver,
            self,
            eq(bounds.bottom(), bounds.y() + bounds.height()),
        )?;
        registrar.submit(
            solver,
            self,
            eq(bounds.center_x(), bounds.x() + bounds.width() * 0.5),
        )?;
        registrar.submit(
            solver,
            self,
            eq(bounds.center_y(), bounds.y() + bounds.height() * 0.5),
        )?;
        registrar.submit(solver, self, ge0(bounds.width()))?;
        registrar.submit(solver, self, ge0(bounds.height()))?;

        Ok(bounds)
    }

    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.entries.get(name)
    }

    /// Whether the handle was minted by this space.
    pub fn is_registered(&self, variable: &Variable) -> bool {
        self.names.contains_key(&variable.raw())
    }

    /// Cached value of a variable; 0.0 until the first solve-apply.
    pub fn value(&self, variable: &Variable) -> f64 {
        self.values.get(&variable.raw()).copied().unwrap_or(0.0)
    }

    /// Merge solved deltas into the value cache. Called only from the
    /// solve-apply path.
    pub(crate) fn apply(&mut self, changes: impl IntoIterator<Item = (RawVariable, f64)>) {
        for (raw, value) in changes {
            self.values.insert(raw, value);
        }
    }

    /// Drain the solver's accumulated deltas into the value cache.
    ///
    /// This is the apply half of the solve-apply cycle; cached values are
    /// mutated nowhere else.
    pub fn apply_from(&mut self, solver: &mut Solver) {
        let changes = solver.take_changes();
        self.apply(changes);
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all variables in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.entries.values()
    }
}

/// A named rectangle: four primitive variables plus derived attributes.
///
/// The owning space guarantees `right = x + width`, `bottom = y + height`,
/// `center_x = x + width/2`, `center_y = y + height/2`, `width >= 0` and
/// `height >= 0` as required constraints, so any satisfiably solved bounds
/// is a well-formed rectangle.
#[derive(Debug, Clone)]
pub struct Bounds {
    name: String,
    kind: BoundsKind,
    x: Variable,
    y: Variable,
    width: Variable,
    height: Variable,
    right: Variable,
    bottom: Variable,
    center_x: Variable,
    center_y: Variable,
}

impl Bounds {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BoundsKind {
        self.kind
    }

    pub fn x(&self) -> Variable {
        self.x.clone()
    }

    pub fn y(&self) -> Variable {
        self.y.clone()
    }

    pub fn width(&self) -> Variable {
        self.width.clone()
    }

    pub fn height(&self) -> Variable {
        self.height.clone()
    }

    pub fn right(&self) -> Variable {
        self.right.clone()
    }

    pub fn bottom(&self) -> Variable {
        self.bottom.clone()
    }

    pub fn center_x(&self) -> Variable {
        self.center_x.clone()
    }

    pub fn center_y(&self) -> Variable {
        self.center_y.clone()
    }

    /// Alias for `x()`.
    pub fn left(&self) -> Variable {
        self.x()
    }

    /// Alias for `y()`.
    pub fn top(&self) -> Variable {
        self.y()
    }

    /// Variable backing an alignable attribute.
    pub fn attr(&self, attr: AlignAttr) -> Variable {
        match attr {
            AlignAttr::Left => self.x(),
            AlignAttr::Right => self.right(),
            AlignAttr::Top => self.y(),
            AlignAttr::Bottom => self.bottom(),
            AlignAttr::CenterX => self.center_x(),
            AlignAttr::CenterY => self.center_y(),
            AlignAttr::Width => self.width(),
            AlignAttr::Height => self.height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::POSITION_TOLERANCE;

    #[test]
    fn test_duplicate_variable_rejected() {
        let mut space = VariableSpace::new();
        space.create_variable("node.x", VarRole::AnchorX).unwrap();
        let err = space.create_variable("node.x", VarRole::AnchorX);
        assert!(matches!(
            err,
            Err(ConfigError::DuplicateVariable { name }) if name == "node.x"
        ));
    }

    #[test]
    fn test_value_defaults_to_zero() {
        let mut space = VariableSpace::new();
        let v = space.create_variable("free", VarRole::Hint).unwrap();
        assert_eq!(space.value(&v), 0.0);
    }

    #[test]
    fn test_bounds_variable_names() {
        let mut space = VariableSpace::new();
        let mut solver = Solver::new();
        let mut registrar = ConstraintRegistrar::new();
        let bounds = space
            .create_bounds(&mut solver, &mut registrar, "a:box/0.bounds", BoundsKind::Symbol)
            .unwrap();
        assert_eq!(bounds.x().name(), "a:box/0.bounds.x");
        assert_eq!(bounds.center_y().name(), "a:box/0.bounds.center_y");
        assert_eq!(space.len(), 8);
        assert_eq!(registrar.len(), 6);
    }

    #[test]
    fn test_bounds_invariants_hold_after_solve() {
        let mut space = VariableSpace::new();
        let mut solver = Solver::new();
        let mut registrar = ConstraintRegistrar::new();
        let bounds = space
            .create_bounds(&mut solver, &mut registrar, "b", BoundsKind::Free)
            .unwrap();

        registrar
            .submit(&mut solver, &space, eq(bounds.x(), 10.0))
            .unwrap();
        registrar
            .submit(&mut solver, &space, eq(bounds.y(), 20.0))
            .unwrap();
        registrar
            .submit(&mut solver, &space, eq(bounds.width(), 30.0))
            .unwrap();
        registrar
            .submit(&mut solver, &space, eq(bounds.height(), 40.0))
            .unwrap();

        space.apply_from(&mut solver);

        assert!((space.value(&bounds.right()) - 40.0).abs() < POSITION_TOLERANCE);
        assert!((space.value(&bounds.bottom()) - 60.0).abs() < POSITION_TOLERANCE);
        assert!((space.value(&bounds.center_x()) - 25.0).abs() < POSITION_TOLERANCE);
        assert!((space.value(&bounds.center_y()) - 40.0).abs() < POSITION_TOLERANCE);
    }

    #[test]
    fn test_attr_lookup() {
        let mut space = VariableSpace::new();
        let mut solver = Solver::new();
        let mut registrar = ConstraintRegistrar::new();
        let bounds = space
            .create_bounds(&mut solver, &mut registrar, "c", BoundsKind::Free)
            .unwrap();
        assert_eq!(bounds.attr(AlignAttr::Left), bounds.x());
        assert_eq!(bounds.attr(AlignAttr::Bottom), bounds.bottom());
        assert_eq!(bounds.attr(AlignAttr::Width), bounds.width());
    }
}
