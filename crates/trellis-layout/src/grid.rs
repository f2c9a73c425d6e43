//! Grid hint builder: guide variables, cell equalities, and areas.
//!
//! A grid over an M-column, N-row cell matrix owns M+1 vertical and N+1
//! horizontal guide variables plus per-track width/height variables. The
//! matrix is validated before anything is minted, so a malformed matrix
//! leaves the variable space and the solver untouched.

use trellis_core::{ConfigError, HintId, LayoutError};
use trellis_constraint::{eq, ge0, Bounds, Expr, Variable};

use crate::context::LayoutContext;

/// A validated grid builder, ready to lay out.
pub struct Grid<'a> {
    ctx: &'a mut LayoutContext,
    cells: Vec<Vec<Option<Bounds>>>,
    rows: usize,
    cols: usize,
    padding: f64,
}

impl<'a> Grid<'a> {
    /// Validate the cell matrix: non-empty and rectangular.
    pub(crate) fn validate(
        ctx: &'a mut LayoutContext,
        cells: Vec<Vec<Option<Bounds>>>,
    ) -> Result<Self, LayoutError> {
        if cells.is_empty() || cells[0].is_empty() {
            return Err(ConfigError::EmptyGrid.into());
        }
        let cols = cells[0].len();
        for (row, columns) in cells.iter().enumerate() {
            if columns.len() != cols {
                return Err(ConfigError::RaggedGrid {
                    row,
                    expected: cols,
                    found: columns.len(),
                }
                .into());
            }
        }
        let rows = cells.len();
        Ok(Self {
            ctx,
            cells,
            rows,
            cols,
            padding: 0.0,
        })
    }

    /// Padding between the container edges and the outer guides, used by
    /// [`in_container`](Self::in_container).
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Lay the grid out free-floating.
    pub fn layout(self) -> Result<GridHandle, LayoutError> {
        self.build(None)
    }

    /// Lay the grid out with its outer guides pinned to the container,
    /// inset by the padding.
    pub fn in_container(self, container: &Bounds) -> Result<GridHandle, LayoutError> {
        let container = container.clone();
        self.build(Some(container))
    }

    fn build(self, container: Option<Bounds>) -> Result<GridHandle, LayoutError> {
        let Grid {
            ctx,
            cells,
            rows,
            cols,
            padding,
        } = self;

        let (id, (xs, ys, widths, heights)) = ctx.register_hint_with("grid", move |scope| {
            let mut xs = Vec::with_capacity(cols + 1);
            for c in 0..=cols {
                xs.push(scope.hint_variable(Some(&format!("x{}", c)))?);
            }
            let mut ys = Vec::with_capacity(rows + 1);
            for r in 0..=rows {
                ys.push(scope.hint_variable(Some(&format!("y{}", r)))?);
            }
            let mut widths = Vec::with_capacity(cols);
            for c in 0..cols {
                widths.push(scope.hint_variable(Some(&format!("width{}", c)))?);
            }
            let mut heights = Vec::with_capacity(rows);
            for r in 0..rows {
                heights.push(scope.hint_variable(Some(&format!("height{}", r)))?);
            }

            for c in 0..cols {
                scope.submit(eq(xs[c + 1].clone(), xs[c].clone() + widths[c].clone()))?;
                scope.submit(ge0(widths[c].clone()))?;
            }
            for r in 0..rows {
                scope.submit(eq(ys[r + 1].clone(), ys[r].clone() + heights[r].clone()))?;
                scope.submit(ge0(heights[r].clone()))?;
            }

            for (r, row) in cells.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    if let Some(bounds) = cell {
                        scope.submit(eq(bounds.x(), xs[c].clone()))?;
                        scope.submit(eq(bounds.right(), xs[c + 1].clone()))?;
                        scope.submit(eq(bounds.y(), ys[r].clone()))?;
                        scope.submit(eq(bounds.bottom(), ys[r + 1].clone()))?;
                    }
                }
            }

            if let Some(container) = &container {
                scope.submit(eq(xs[0].clone(), container.x() + padding))?;
                scope.submit(eq(xs[cols].clone(), container.right() - padding))?;
                scope.submit(eq(ys[0].clone(), container.y() + padding))?;
                scope.submit(eq(ys[rows].clone(), container.bottom() - padding))?;
            }

            Ok((scope.id().clone(), (xs, ys, widths, heights)))
        })?;

        Ok(GridHandle {
            id,
            xs,
            ys,
            widths,
            heights,
        })
    }
}

/// Guide indices of a rectangular grid area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpan {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

/// The guide variables bounding a grid area.
#[derive(Debug, Clone)]
pub struct GridArea {
    left: Variable,
    top: Variable,
    right: Variable,
    bottom: Variable,
}

impl GridArea {
    pub fn left(&self) -> Variable {
        self.left.clone()
    }

    pub fn top(&self) -> Variable {
        self.top.clone()
    }

    pub fn right(&self) -> Variable {
        self.right.clone()
    }

    pub fn bottom(&self) -> Variable {
        self.bottom.clone()
    }

    /// `right - left` as an expression.
    pub fn width(&self) -> Expr {
        self.right.clone() - self.left.clone()
    }

    /// `bottom - top` as an expression.
    pub fn height(&self) -> Expr {
        self.bottom.clone() - self.top.clone()
    }
}

/// A laid-out grid: its hint id and guide variable arrays.
pub struct GridHandle {
    id: HintId,
    xs: Vec<Variable>,
    ys: Vec<Variable>,
    widths: Vec<Variable>,
    heights: Vec<Variable>,
}

impl GridHandle {
    pub fn id(&self) -> &HintId {
        &self.id
    }

    /// Vertical guide positions (column boundaries), cols + 1 entries.
    pub fn xs(&self) -> &[Variable] {
        &self.xs
    }

    /// Horizontal guide positions (row boundaries), rows + 1 entries.
    pub fn ys(&self) -> &[Variable] {
        &self.ys
    }

    /// Per-column widths, cols entries.
    pub fn widths(&self) -> &[Variable] {
        &self.widths
    }

    /// Per-row heights, rows entries.
    pub fn heights(&self) -> &[Variable] {
        &self.heights
    }

    /// The rectangle spanning the given guide indices.
    ///
    /// Requires `bottom > top`, `right > left`, and indices within the
    /// guide arrays.
    pub fn get_area(&self, span: GridSpan) -> Result<GridArea, ConfigError> {
        let GridSpan {
            top,
            left,
            bottom,
            right,
        } = span;
        if bottom <= top || right <= left || right >= self.xs.len() || bottom >= self.ys.len() {
            return Err(ConfigError::AreaOutOfRange {
                top,
                left,
                bottom,
                right,
                columns: self.xs.len(),
                rows: self.ys.len(),
            });
        }
        Ok(GridArea {
            left: self.xs[left].clone(),
            top: self.ys[top].clone(),
            right: self.xs[right].clone(),
            bottom: self.ys[bottom].clone(),
        })
    }
}
