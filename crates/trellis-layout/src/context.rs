//! The layout context: one diagram's constraint universe.
//!
//! A `LayoutContext` owns exactly one solver instance, one variable space,
//! one constraint registrar, one hint registry, and one symbol registry.
//! Contexts share nothing, so independent diagrams can be built in
//! isolation. All builder entry points and the solve-apply cycle live here.

use trellis_core::{AlignAttr, BoundsKind, ConfigError, HintId, LayoutError, SymbolId};
use trellis_constraint::{
    Bounds, ConstraintId, ConstraintRegistrar, ConstraintSpec, Solver, Variable, VariableSpace,
};

use crate::grid::Grid;
use crate::guide::{GuideX, GuideY};
use crate::hints::{registration_parts, HintRegistry, HintScope};
use crate::rect::Rect;
use crate::relations::{Align, Arrange, Enclose};
use crate::symbols::{Symbol, SymbolCharacs, SymbolRegistration, SymbolRegistry};

/// Top-level orchestrator for one diagram's layout.
#[derive(Default)]
pub struct LayoutContext {
    solver: Solver,
    space: VariableSpace,
    registrar: ConstraintRegistrar,
    hints: HintRegistry,
    symbols: SymbolRegistry,
}

impl LayoutContext {
    pub fn new() -> Self {
        Self::default()
    }

    // --- variables and raw constraints -----------------------------------

    /// Create a free-standing bounds aggregate under `prefix`.
    pub fn create_bounds(&mut self, prefix: &str) -> Result<Bounds, LayoutError> {
        self.space
            .create_bounds(&mut self.solver, &mut self.registrar, prefix, BoundsKind::Free)
    }

    /// Submit a custom constraint.
    pub fn submit(&mut self, spec: ConstraintSpec) -> Result<ConstraintId, LayoutError> {
        self.registrar.submit(&mut self.solver, &self.space, spec)
    }

    /// Remove a previously submitted constraint.
    pub fn remove_constraint(&mut self, id: ConstraintId) -> Result<(), LayoutError> {
        self.registrar.remove(&mut self.solver, id)
    }

    /// Remove and unregister every tracked constraint.
    pub fn clear_constraints(&mut self) {
        self.registrar.clear(&mut self.solver);
    }

    /// Drop registrar references to constraints the solver no longer holds.
    pub fn compact_constraints(&mut self) {
        self.registrar.compact(&self.solver);
    }

    pub fn variable_count(&self) -> usize {
        self.space.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.registrar.len()
    }

    // --- symbols ----------------------------------------------------------

    /// Register a symbol factory for `plugin:name`.
    pub fn register_factory<F>(
        &mut self,
        plugin: &str,
        name: &str,
        factory: F,
    ) -> Result<(), LayoutError>
    where
        F: Fn() -> Box<dyn Symbol> + 'static,
    {
        Ok(self.symbols.register_factory(plugin, name, factory)?)
    }

    /// Create and register a symbol through its factory.
    pub fn add_symbol(&mut self, plugin: &str, name: &str) -> Result<SymbolId, LayoutError> {
        let symbol = self.symbols.create_symbol(plugin, name)?;
        self.register_pipeline(plugin, name, symbol)
    }

    /// Register a symbol object directly, without a factory.
    pub fn add_symbol_with(
        &mut self,
        plugin: &str,
        name: &str,
        symbol: Box<dyn Symbol>,
    ) -> Result<SymbolId, LayoutError> {
        self.register_pipeline(plugin, name, symbol)
    }

    fn register_pipeline(
        &mut self,
        plugin: &str,
        name: &str,
        symbol: Box<dyn Symbol>,
    ) -> Result<SymbolId, LayoutError> {
        let mark = self.registrar.mark();
        let mut registration = self.symbols.begin(plugin, name);
        let staged = self.run_pipeline(&mut registration, symbol);
        let built = staged.and_then(|()| Ok(self.symbols.finish(registration)?));
        match built {
            Ok(id) => Ok(id),
            Err(err) => {
                // Atomic registration: withdraw everything this symbol
                // submitted before surfacing the failure.
                self.registrar.rollback_to(&mut self.solver, mark);
                Err(err)
            }
        }
    }

    fn run_pipeline(
        &mut self,
        registration: &mut SymbolRegistration,
        symbol: Box<dyn Symbol>,
    ) -> Result<(), LayoutError> {
        let id = registration.id().clone();
        let bounds = self.space.create_bounds(
            &mut self.solver,
            &mut self.registrar,
            &format!("{}.bounds", id),
            BoundsKind::Symbol,
        )?;
        let container_bounds = if symbol.needs_container_bounds() {
            Some(self.space.create_bounds(
                &mut self.solver,
                &mut self.registrar,
                &format!("{}.container", id),
                BoundsKind::Container,
            )?)
        } else {
            None
        };
        let item_bounds = if symbol.needs_item_bounds() {
            Some(self.space.create_bounds(
                &mut self.solver,
                &mut self.registrar,
                &format!("{}.item", id),
                BoundsKind::Item,
            )?)
        } else {
            None
        };
        registration.attach_bounds(bounds, container_bounds, item_bounds)?;
        registration.set_characs(symbol.extension_fields())?;
        registration.set_symbol(symbol)?;
        registration.apply_constraints(&mut self.solver, &self.space, &mut self.registrar)?;
        Ok(())
    }

    /// The symbol registry, for lookups and iteration.
    pub fn symbols(&self) -> &SymbolRegistry {
        &self.symbols
    }

    /// Clone out a symbol's main bounds.
    pub fn symbol_bounds(&self, id: &SymbolId) -> Option<Bounds> {
        self.symbols
            .find_by_id(id)
            .and_then(|registration| registration.characs())
            .map(|characs| characs.bounds().clone())
    }

    /// Mutable access to a symbol's characs (extension fields).
    pub fn symbol_characs_mut(&mut self, id: &SymbolId) -> Option<&mut SymbolCharacs> {
        self.symbols.find_by_id_mut(id).and_then(|r| r.characs_mut())
    }

    // --- hints ------------------------------------------------------------

    /// Register a hint: the closure compiles the relation through the scope
    /// and must return the id the scope was assigned.
    pub fn register_hint<F>(&mut self, label: &str, build: F) -> Result<HintId, LayoutError>
    where
        F: FnOnce(&mut HintScope<'_>) -> Result<HintId, LayoutError>,
    {
        let (id, ()) = self.register_hint_with(label, |scope| {
            let id = build(scope)?;
            Ok((id, ()))
        })?;
        Ok(id)
    }

    /// Like [`register_hint`](Self::register_hint), but the closure can hand
    /// back a payload (guide variables, grid handles).
    pub fn register_hint_with<T, F>(
        &mut self,
        label: &str,
        build: F,
    ) -> Result<(HintId, T), LayoutError>
    where
        F: FnOnce(&mut HintScope<'_>) -> Result<(HintId, T), LayoutError>,
    {
        let sequence = self.hints.reserve(label);
        let id = HintId::new(label, sequence);
        let mark = self.registrar.mark();
        let mut scope = HintScope {
            id: id.clone(),
            base: format!("{}/{}", label, sequence),
            solver: &mut self.solver,
            space: &mut self.space,
            registrar: &mut self.registrar,
            variables: Vec::new(),
            constraints: Vec::new(),
        };
        let outcome = build(&mut scope);
        let variables = scope.variables;
        let constraints = scope.constraints;
        match outcome {
            Ok((returned, value)) if returned == id => {
                self.hints
                    .insert(registration_parts(id.clone(), label, sequence, variables, constraints));
                Ok((id, value))
            }
            Ok((returned, _)) => {
                self.registrar.rollback_to(&mut self.solver, mark);
                self.hints.release(label, sequence);
                Err(ConfigError::HintIdMismatch {
                    expected: id.to_string(),
                    returned: returned.to_string(),
                }
                .into())
            }
            Err(err) => {
                self.registrar.rollback_to(&mut self.solver, mark);
                self.hints.release(label, sequence);
                Err(err)
            }
        }
    }

    /// The hint registry, for lookups and render-order records.
    pub fn hints(&self) -> &HintRegistry {
        &self.hints
    }

    pub(crate) fn submit_for_hint(
        &mut self,
        id: &HintId,
        spec: ConstraintSpec,
    ) -> Result<ConstraintId, LayoutError> {
        let constraint = self.registrar.submit(&mut self.solver, &self.space, spec)?;
        self.hints.append_constraint(id, constraint);
        Ok(constraint)
    }

    pub(crate) fn record_enclosure(&mut self, container: String, children: Vec<String>) {
        self.hints.record_enclosure(container, children);
    }

    // --- builder entry points ---------------------------------------------

    /// Arrange targets left to right with the given gap.
    pub fn arrange_horizontal(
        &mut self,
        targets: &[&Bounds],
        gap: f64,
    ) -> Result<HintId, LayoutError> {
        Arrange::horizontal(targets).with_gap(gap).register(self)
    }

    /// Arrange targets top to bottom with the given gap.
    pub fn arrange_vertical(
        &mut self,
        targets: &[&Bounds],
        gap: f64,
    ) -> Result<HintId, LayoutError> {
        Arrange::vertical(targets).with_gap(gap).register(self)
    }

    /// Align an attribute across targets; the first target is the reference.
    pub fn align(&mut self, attr: AlignAttr, targets: &[&Bounds]) -> Result<HintId, LayoutError> {
        Align::new(attr, targets).register(self)
    }

    /// Enclose children in a container with the given padding.
    pub fn enclose(
        &mut self,
        container: &Bounds,
        children: &[&Bounds],
        padding: f64,
    ) -> Result<HintId, LayoutError> {
        Enclose::new(container, children)
            .with_padding(padding)
            .register(self)
    }

    /// Start a grid over the cell matrix. The matrix is validated here,
    /// before any variable or constraint is created.
    pub fn grid(&mut self, cells: Vec<Vec<Option<Bounds>>>) -> Result<Grid<'_>, LayoutError> {
        Grid::validate(self, cells)
    }

    /// Create a vertical guide (a shared x-coordinate).
    pub fn guide_x(&mut self) -> Result<GuideX<'_>, LayoutError> {
        GuideX::create(self)
    }

    /// Create a horizontal guide (a shared y-coordinate).
    pub fn guide_y(&mut self) -> Result<GuideY<'_>, LayoutError> {
        GuideY::create(self)
    }

    // --- solve-apply cycle ------------------------------------------------

    /// Resolve the system without writing results back.
    ///
    /// The solver is incremental: conflicts surface when constraints are
    /// submitted, so this only refreshes the pending solution snapshot.
    pub fn solve(&mut self) -> Result<(), LayoutError> {
        self.solver.refresh();
        Ok(())
    }

    /// Resolve the system and copy solved values onto every registered
    /// variable. Re-solving with no constraint changes is idempotent.
    pub fn solve_and_apply(&mut self) -> Result<(), LayoutError> {
        self.solver.refresh();
        self.space.apply_from(&mut self.solver);
        Ok(())
    }

    /// Read a variable's applied value (0.0 before the first apply).
    pub fn value_of(&self, variable: &Variable) -> f64 {
        self.space.value(variable)
    }

    /// Resolve a bounds aggregate into a numeric rect.
    pub fn rect_of(&self, bounds: &Bounds) -> Rect {
        Rect::new(
            self.space.value(&bounds.x()),
            self.space.value(&bounds.y()),
            self.space.value(&bounds.width()),
            self.space.value(&bounds.height()),
        )
    }

    /// Resolved rect of a symbol's main bounds.
    pub fn symbol_rect(&self, id: &SymbolId) -> Option<Rect> {
        self.symbols
            .find_by_id(id)
            .and_then(|registration| registration.characs())
            .map(|characs| self.rect_of(characs.bounds()))
    }

    /// All symbol rects in registration order, for the rendering layer.
    pub fn resolved_rects(&self) -> Vec<(SymbolId, Rect)> {
        self.symbols
            .iter()
            .filter_map(|registration| {
                registration
                    .characs()
                    .map(|characs| (characs.id().clone(), self.rect_of(characs.bounds())))
            })
            .collect()
    }
}
