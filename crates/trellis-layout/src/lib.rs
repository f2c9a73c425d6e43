//! Diagram layout from declarative spatial relations.
//!
//! Symbols declare bounds; hints (arrange, align, enclose, grid, guide)
//! compile into prioritized linear constraints; one solve resolves the whole
//! diagram, nested containers included. This crate provides:
//! - The symbol registry: factories, characs, and the registration pipeline
//! - The hint registry and the fluent hint builders
//! - `LayoutContext`, the per-diagram orchestrator with the solve-apply
//!   cycle
//!
//! ```
//! use trellis_layout::{Arrange, LayoutContext};
//! use trellis_layout::constraint::eq;
//!
//! let mut ctx = LayoutContext::new();
//! let a = ctx.create_bounds("a").unwrap();
//! let b = ctx.create_bounds("b").unwrap();
//! ctx.submit(eq(a.width(), 120.0)).unwrap();
//! ctx.submit(eq(b.width(), 80.0)).unwrap();
//! Arrange::horizontal(&[&a, &b]).with_gap(24.0).register(&mut ctx).unwrap();
//! ctx.solve_and_apply().unwrap();
//! let (ra, rb) = (ctx.rect_of(&a), ctx.rect_of(&b));
//! assert!((rb.x - (ra.right() + 24.0)).abs() < 1e-5);
//! ```

mod context;
mod grid;
mod guide;
mod hints;
mod rect;
mod relations;
mod symbols;

pub use context::LayoutContext;
pub use grid::{Grid, GridArea, GridHandle, GridSpan};
pub use guide::{GuideX, GuideY};
pub use hints::{Enclosure, HintRegistration, HintRegistry, HintScope};
pub use rect::Rect;
pub use relations::{Align, Arrange, Enclose};
pub use symbols::{
    BoundsCtx, CharacValue, RegistrationState, Symbol, SymbolCharacs, SymbolFactory,
    SymbolRegistration, SymbolRegistry,
};

pub use trellis_core::{
    AlignAttr, Axis, BoundsKind, ConfigError, HintId, LayoutError, SolverError, Strength,
    SymbolId, DEFAULT_GAP, DEFAULT_PADDING, POSITION_TOLERANCE,
};

/// Re-export of the constraint DSL for symbol and hint authors.
pub mod constraint {
    pub use trellis_constraint::{
        eq, eq0, ge, ge0, le, le0, Bounds, ConstraintId, ConstraintSpec, Expr, Relation, Term,
        VarRole, Variable,
    };
}
