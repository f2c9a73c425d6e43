//! Arrange, align, and enclose hint builders.
//!
//! Each builder collects its targets and options, then compiles one hint
//! registration when `register` is called. All inputs are validated before
//! anything reaches the solver.

use trellis_core::{AlignAttr, Axis, HintId, LayoutError, Strength, DEFAULT_GAP, DEFAULT_PADDING};
use trellis_constraint::{eq, ge, le, Bounds};

use crate::context::LayoutContext;

/// Chain targets along an axis with a fixed gap.
///
/// Emits `target[i].start == target[i-1].end + gap` for every adjacent
/// pair. Fewer than two targets is a no-op, never an error.
pub struct Arrange {
    axis: Axis,
    targets: Vec<Bounds>,
    gap: f64,
    strength: Strength,
}

impl Arrange {
    pub fn new(axis: Axis, targets: &[&Bounds]) -> Self {
        Self {
            axis,
            targets: targets.iter().map(|bounds| (*bounds).clone()).collect(),
            gap: DEFAULT_GAP,
            strength: Strength::Medium,
        }
    }

    /// Left-to-right arrangement.
    pub fn horizontal(targets: &[&Bounds]) -> Self {
        Self::new(Axis::X, targets)
    }

    /// Top-to-bottom arrangement.
    pub fn vertical(targets: &[&Bounds]) -> Self {
        Self::new(Axis::Y, targets)
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }

    /// Compile the arrangement into a hint registration.
    pub fn register(self, ctx: &mut LayoutContext) -> Result<HintId, LayoutError> {
        let Arrange {
            axis,
            targets,
            gap,
            strength,
        } = self;
        ctx.register_hint("arrange", move |scope| {
            for pair in targets.windows(2) {
                let spec = match axis {
                    Axis::X => eq(pair[1].x(), pair[0].right() + gap),
                    Axis::Y => eq(pair[1].y(), pair[0].bottom() + gap),
                };
                scope.submit(spec.with_strength(strength))?;
            }
            Ok(scope.id().clone())
        })
    }
}

/// Equate one attribute across targets.
///
/// Emits `target[i].attr == target[0].attr` for i in 1..N, so the first
/// target is the reference and wins under same-strength ties.
pub struct Align {
    attr: AlignAttr,
    targets: Vec<Bounds>,
    strength: Strength,
}

impl Align {
    pub fn new(attr: AlignAttr, targets: &[&Bounds]) -> Self {
        Self {
            attr,
            targets: targets.iter().map(|bounds| (*bounds).clone()).collect(),
            strength: Strength::Medium,
        }
    }

    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }

    /// Compile the alignment into a hint registration.
    pub fn register(self, ctx: &mut LayoutContext) -> Result<HintId, LayoutError> {
        let Align {
            attr,
            targets,
            strength,
        } = self;
        ctx.register_hint("align", move |scope| {
            if let Some((reference, rest)) = targets.split_first() {
                for target in rest {
                    scope.submit(eq(target.attr(attr), reference.attr(attr)).with_strength(strength))?;
                }
            }
            Ok(scope.id().clone())
        })
    }
}

/// Keep children inside a container, padded, and shrink the container to
/// fit them.
///
/// Containment is required; the shrink-to-fit pull is weak, so an
/// otherwise-free container hugs the tight bounding box of its children
/// inset by the padding. Nested enclosures all land in the same solver and
/// resolve together.
pub struct Enclose {
    container: Bounds,
    children: Vec<Bounds>,
    padding: f64,
}

impl Enclose {
    pub fn new(container: &Bounds, children: &[&Bounds]) -> Self {
        Self {
            container: container.clone(),
            children: children.iter().map(|bounds| (*bounds).clone()).collect(),
            padding: DEFAULT_PADDING,
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Compile the enclosure into a hint registration and record the
    /// render-order entry (container beneath children).
    pub fn register(self, ctx: &mut LayoutContext) -> Result<HintId, LayoutError> {
        let Enclose {
            container,
            children,
            padding,
        } = self;
        let container_name = container.name().to_string();
        let child_names: Vec<String> = children
            .iter()
            .map(|child| child.name().to_string())
            .collect();

        let id = {
            ctx.register_hint("enclose", move |scope| {
                for child in &children {
                    scope.submit(ge(child.x(), container.x() + padding))?;
                    scope.submit(le(child.right(), container.right() - padding))?;
                    scope.submit(ge(child.y(), container.y() + padding))?;
                    scope.submit(le(child.bottom(), container.bottom() - padding))?;

                    scope.submit(eq(container.x(), child.x() - padding).weak())?;
                    scope.submit(eq(container.right(), child.right() + padding).weak())?;
                    scope.submit(eq(container.y(), child.y() - padding).weak())?;
                    scope.submit(eq(container.bottom(), child.bottom() + padding).weak())?;
                }
                Ok(scope.id().clone())
            })?
        };
        ctx.record_enclosure(container_name, child_names);
        Ok(id)
    }
}
