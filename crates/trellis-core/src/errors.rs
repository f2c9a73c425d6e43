//! Error types for the Trellis layout engine.

use thiserror::Error;

/// Top-level error type for the layout engine.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Errors raised by construction and registration APIs.
///
/// All of these are synchronous and fail-fast: they are returned at the
/// offending call, before solver state is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Variable '{name}' is already registered")]
    DuplicateVariable { name: String },

    #[error("Constraint references unregistered variable '{name}'")]
    UnknownVariable { name: String },

    #[error("Symbol factory '{plugin}:{name}' is already registered")]
    DuplicateFactory { plugin: String, name: String },

    #[error("No symbol factory registered for '{plugin}:{name}'")]
    UnknownFactory { plugin: String, name: String },

    #[error("Symbol registration '{id}' cannot {action} in state {state}")]
    RegistrationOutOfOrder {
        id: String,
        action: &'static str,
        state: &'static str,
    },

    #[error("Symbol registration '{id}' cannot build: {missing} was never set")]
    IncompleteRegistration { id: String, missing: &'static str },

    #[error("Characs extension field may not use reserved key '{key}'")]
    ReservedCharacsKey { key: String },

    #[error("Grid matrix is empty")]
    EmptyGrid,

    #[error("Grid matrix is not rectangular: row {row} has {found} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "Grid area (top: {top}, left: {left}, bottom: {bottom}, right: {right}) is out of range \
         for a grid with {columns} column guides and {rows} row guides"
    )]
    AreaOutOfRange {
        top: usize,
        left: usize,
        bottom: usize,
        right: usize,
        columns: usize,
        rows: usize,
    },

    #[error("Guide '{guide}' already follows a target")]
    GuideAlreadyFollows { guide: String },

    #[error("Hint builder for '{expected}' returned id '{returned}'")]
    HintIdMismatch { expected: String, returned: String },
}

/// Errors propagated from the constraint solver, unmodified.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Unsatisfiable required constraint: {constraint}")]
    Unsatisfiable { constraint: String },

    #[error("Constraint already present in the solver: {constraint}")]
    DuplicateConstraint { constraint: String },

    #[error("Constraint is not held by the solver")]
    UnknownConstraint,

    #[error("Internal solver error: {reason}")]
    Internal { reason: String },
}
