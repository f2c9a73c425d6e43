//! Symbol registration: factories, characs, and the build state machine.
//!
//! A symbol's layout identity is created atomically: id minting, bounds
//! creation, characs, the symbol object itself, and its internal layout
//! constraints either all land in the registry or none do. Registration is a
//! linear state machine; every transition checks the current state, and
//! `build` refuses a registration whose characs or symbol were never set.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use trellis_core::{ConfigError, LayoutError, SymbolId};
use trellis_constraint::{
    Bounds, ConstraintId, ConstraintRegistrar, ConstraintSpec, Solver, VariableSpace,
};

/// A typed extension value on a symbol's characs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CharacValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

/// The non-visual identity record of a symbol: id, bounds, and
/// plugin-defined extension fields.
pub struct SymbolCharacs {
    id: SymbolId,
    bounds: Bounds,
    container_bounds: Option<Bounds>,
    item_bounds: Option<Bounds>,
    extensions: IndexMap<String, CharacValue>,
}

impl SymbolCharacs {
    fn new(
        id: SymbolId,
        bounds: Bounds,
        container_bounds: Option<Bounds>,
        item_bounds: Option<Bounds>,
    ) -> Self {
        Self {
            id,
            bounds,
            container_bounds,
            item_bounds,
            extensions: IndexMap::new(),
        }
    }

    pub fn id(&self) -> &SymbolId {
        &self.id
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn container_bounds(&self) -> Option<&Bounds> {
        self.container_bounds.as_ref()
    }

    pub fn item_bounds(&self) -> Option<&Bounds> {
        self.item_bounds.as_ref()
    }

    /// Set a plugin extension field.
    ///
    /// The keys `id` and `bounds` are reserved.
    pub fn set_extension(&mut self, key: &str, value: CharacValue) -> Result<(), ConfigError> {
        if key == "id" || key == "bounds" {
            return Err(ConfigError::ReservedCharacsKey {
                key: key.to_string(),
            });
        }
        self.extensions.insert(key.to_string(), value);
        Ok(())
    }

    pub fn extension(&self, key: &str) -> Option<&CharacValue> {
        self.extensions.get(key)
    }

    pub fn extensions(&self) -> impl Iterator<Item = (&str, &CharacValue)> {
        self.extensions.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Constraint-submission context handed to `ensure_layout_bounds`.
pub struct BoundsCtx<'a> {
    characs: &'a SymbolCharacs,
    solver: &'a mut Solver,
    space: &'a VariableSpace,
    registrar: &'a mut ConstraintRegistrar,
}

impl BoundsCtx<'_> {
    /// The symbol's main bounds.
    pub fn bounds(&self) -> &Bounds {
        self.characs.bounds()
    }

    pub fn container_bounds(&self) -> Option<&Bounds> {
        self.characs.container_bounds()
    }

    pub fn item_bounds(&self) -> Option<&Bounds> {
        self.characs.item_bounds()
    }

    /// Submit an internal layout constraint for this symbol.
    pub fn submit(&mut self, spec: ConstraintSpec) -> Result<ConstraintId, LayoutError> {
        self.registrar.submit(self.solver, self.space, spec)
    }
}

/// A symbol type, as seen by the layout engine.
///
/// Rendering concerns live elsewhere; this trait only covers the layout
/// contract every symbol must fulfill.
pub trait Symbol {
    /// Submit the symbol's internal layout constraints (minimum sizes,
    /// container/item coupling, preferred dimensions). Invoked exactly once
    /// during registration.
    fn ensure_layout_bounds(&self, ctx: &mut BoundsCtx<'_>) -> Result<(), LayoutError>;

    /// Whether registration should mint a separate container bounds.
    fn needs_container_bounds(&self) -> bool {
        false
    }

    /// Whether registration should mint a separate item bounds.
    fn needs_item_bounds(&self) -> bool {
        false
    }

    /// Extension fields to record on the characs.
    fn extension_fields(&self) -> Vec<(String, CharacValue)> {
        Vec::new()
    }
}

/// Factory producing symbol objects for a (plugin, name) pair.
pub type SymbolFactory = Box<dyn Fn() -> Box<dyn Symbol>>;

/// State of a symbol registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Pending,
    BoundsCreated,
    CharacsSet,
    SymbolSet,
    ConstraintsApplied,
    Built,
}

impl RegistrationState {
    fn name(self) -> &'static str {
        match self {
            RegistrationState::Pending => "Pending",
            RegistrationState::BoundsCreated => "BoundsCreated",
            RegistrationState::CharacsSet => "CharacsSet",
            RegistrationState::SymbolSet => "SymbolSet",
            RegistrationState::ConstraintsApplied => "ConstraintsApplied",
            RegistrationState::Built => "Built",
        }
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One symbol's registration record.
pub struct SymbolRegistration {
    id: SymbolId,
    state: RegistrationState,
    bounds: Option<Bounds>,
    container_bounds: Option<Bounds>,
    item_bounds: Option<Bounds>,
    characs: Option<SymbolCharacs>,
    symbol: Option<Box<dyn Symbol>>,
}

impl SymbolRegistration {
    fn new(id: SymbolId) -> Self {
        Self {
            id,
            state: RegistrationState::Pending,
            bounds: None,
            container_bounds: None,
            item_bounds: None,
            characs: None,
            symbol: None,
        }
    }

    pub fn id(&self) -> &SymbolId {
        &self.id
    }

    pub fn state(&self) -> RegistrationState {
        self.state
    }

    pub fn characs(&self) -> Option<&SymbolCharacs> {
        self.characs.as_ref()
    }

    pub fn characs_mut(&mut self) -> Option<&mut SymbolCharacs> {
        self.characs.as_mut()
    }

    pub fn symbol(&self) -> Option<&dyn Symbol> {
        self.symbol.as_deref()
    }

    fn expect_state(
        &self,
        expected: RegistrationState,
        action: &'static str,
    ) -> Result<(), ConfigError> {
        if self.state != expected {
            return Err(ConfigError::RegistrationOutOfOrder {
                id: self.id.to_string(),
                action,
                state: self.state.name(),
            });
        }
        Ok(())
    }

    /// Pending → BoundsCreated.
    pub fn attach_bounds(
        &mut self,
        bounds: Bounds,
        container_bounds: Option<Bounds>,
        item_bounds: Option<Bounds>,
    ) -> Result<(), ConfigError> {
        self.expect_state(RegistrationState::Pending, "attach bounds")?;
        self.bounds = Some(bounds);
        self.container_bounds = container_bounds;
        self.item_bounds = item_bounds;
        self.state = RegistrationState::BoundsCreated;
        Ok(())
    }

    /// BoundsCreated → CharacsSet.
    pub fn set_characs(
        &mut self,
        extensions: Vec<(String, CharacValue)>,
    ) -> Result<(), ConfigError> {
        self.expect_state(RegistrationState::BoundsCreated, "set characs")?;
        // Validate extension keys before consuming the bounds, so a failed
        // call leaves the registration re-usable.
        for (key, _) in &extensions {
            if key == "id" || key == "bounds" {
                return Err(ConfigError::ReservedCharacsKey { key: key.clone() });
            }
        }
        let Some(bounds) = self.bounds.take() else {
            return Err(ConfigError::IncompleteRegistration {
                id: self.id.to_string(),
                missing: "bounds",
            });
        };
        let mut characs = SymbolCharacs::new(
            self.id.clone(),
            bounds,
            self.container_bounds.take(),
            self.item_bounds.take(),
        );
        for (key, value) in extensions {
            characs.set_extension(&key, value)?;
        }
        self.characs = Some(characs);
        self.state = RegistrationState::CharacsSet;
        Ok(())
    }

    /// CharacsSet → SymbolSet.
    pub fn set_symbol(&mut self, symbol: Box<dyn Symbol>) -> Result<(), ConfigError> {
        self.expect_state(RegistrationState::CharacsSet, "set symbol")?;
        self.symbol = Some(symbol);
        self.state = RegistrationState::SymbolSet;
        Ok(())
    }

    /// SymbolSet → ConstraintsApplied; runs `ensure_layout_bounds` exactly
    /// once.
    pub fn apply_constraints(
        &mut self,
        solver: &mut Solver,
        space: &VariableSpace,
        registrar: &mut ConstraintRegistrar,
    ) -> Result<(), LayoutError> {
        self.expect_state(RegistrationState::SymbolSet, "apply constraints")?;
        let Some(symbol) = self.symbol.as_deref() else {
            return Err(ConfigError::IncompleteRegistration {
                id: self.id.to_string(),
                missing: "symbol",
            }
            .into());
        };
        let Some(characs) = self.characs.as_ref() else {
            return Err(ConfigError::IncompleteRegistration {
                id: self.id.to_string(),
                missing: "characs",
            }
            .into());
        };
        let mut ctx = BoundsCtx {
            characs,
            solver,
            space,
            registrar,
        };
        symbol.ensure_layout_bounds(&mut ctx)?;
        self.state = RegistrationState::ConstraintsApplied;
        Ok(())
    }

    /// ConstraintsApplied → Built (terminal).
    ///
    /// Fails if characs or the symbol object were never set, or if the
    /// registration has not had its constraints applied.
    pub fn build(&mut self) -> Result<(), ConfigError> {
        if self.characs.is_none() {
            return Err(ConfigError::IncompleteRegistration {
                id: self.id.to_string(),
                missing: "characs",
            });
        }
        if self.symbol.is_none() {
            return Err(ConfigError::IncompleteRegistration {
                id: self.id.to_string(),
                missing: "symbol",
            });
        }
        self.expect_state(RegistrationState::ConstraintsApplied, "build")?;
        self.state = RegistrationState::Built;
        Ok(())
    }
}

/// Registry of symbol factories and built registrations.
///
/// Registrations are held in an insertion-ordered map, which provides both
/// the O(1) id lookup and the stable iteration order the solve-apply cycle
/// relies on. Sequence counters are per plugin namespace and owned by this
/// instance; two registries never share them.
#[derive(Default)]
pub struct SymbolRegistry {
    factories: HashMap<(String, String), SymbolFactory>,
    registrations: IndexMap<SymbolId, SymbolRegistration>,
    sequences: HashMap<String, u64>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `plugin:name` symbols.
    pub fn register_factory<F>(
        &mut self,
        plugin: &str,
        name: &str,
        factory: F,
    ) -> Result<(), ConfigError>
    where
        F: Fn() -> Box<dyn Symbol> + 'static,
    {
        let key = (plugin.to_string(), name.to_string());
        if self.factories.contains_key(&key) {
            return Err(ConfigError::DuplicateFactory {
                plugin: plugin.to_string(),
                name: name.to_string(),
            });
        }
        self.factories.insert(key, Box::new(factory));
        Ok(())
    }

    /// Instantiate a symbol object from its registered factory.
    pub fn create_symbol(&self, plugin: &str, name: &str) -> Result<Box<dyn Symbol>, ConfigError> {
        let key = (plugin.to_string(), name.to_string());
        match self.factories.get(&key) {
            Some(factory) => Ok(factory()),
            None => Err(ConfigError::UnknownFactory {
                plugin: plugin.to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Mint the next id in the plugin's namespace and open a registration.
    pub fn begin(&mut self, plugin: &str, name: &str) -> SymbolRegistration {
        let sequence = self.sequences.entry(plugin.to_string()).or_insert(0);
        let id = SymbolId::new(plugin, name, *sequence);
        *sequence += 1;
        SymbolRegistration::new(id)
    }

    /// Build and insert a completed registration.
    pub fn finish(&mut self, mut registration: SymbolRegistration) -> Result<SymbolId, ConfigError> {
        registration.build()?;
        let id = registration.id.clone();
        self.registrations.insert(id.clone(), registration);
        Ok(id)
    }

    /// O(1) lookup by id.
    pub fn find_by_id(&self, id: &SymbolId) -> Option<&SymbolRegistration> {
        self.registrations.get(id)
    }

    pub fn find_by_id_mut(&mut self, id: &SymbolId) -> Option<&mut SymbolRegistration> {
        self.registrations.get_mut(id)
    }

    /// Iterate registrations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolRegistration> {
        self.registrations.values()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
