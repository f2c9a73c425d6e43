//! Guide hint builders: shared coordinates without a reference symbol.
//!
//! A guide owns one hint variable. Targets bind their matching attribute to
//! it, or the guide can follow a single target's attribute (at most one
//! follow per guide). Arranging on a guide stacks the bound targets along
//! the orthogonal axis.

use trellis_core::{ConfigError, HintId, LayoutError, DEFAULT_GAP};
use trellis_constraint::{eq, Bounds, Variable};

use crate::context::LayoutContext;

/// A vertical guide: one shared x-coordinate.
pub struct GuideX<'a> {
    ctx: &'a mut LayoutContext,
    id: HintId,
    variable: Variable,
    targets: Vec<Bounds>,
    followed: bool,
}

impl<'a> GuideX<'a> {
    pub(crate) fn create(ctx: &'a mut LayoutContext) -> Result<Self, LayoutError> {
        let (id, variable) = ctx.register_hint_with("guide_x", |scope| {
            let variable = scope.hint_variable(Some("pos"))?;
            Ok((scope.id().clone(), variable))
        })?;
        Ok(Self {
            ctx,
            id,
            variable,
            targets: Vec::new(),
            followed: false,
        })
    }

    /// The underlying hint variable, for custom constraints.
    pub fn variable(&self) -> Variable {
        self.variable.clone()
    }

    pub fn id(&self) -> &HintId {
        &self.id
    }

    fn bind(&mut self, target: &Bounds, attr: Variable) -> Result<&mut Self, LayoutError> {
        self.ctx
            .submit_for_hint(&self.id, eq(attr, self.variable.clone()).strong())?;
        self.targets.push(target.clone());
        Ok(self)
    }

    /// Bind the target's left edge to the guide.
    pub fn align_left(&mut self, target: &Bounds) -> Result<&mut Self, LayoutError> {
        let attr = target.x();
        self.bind(target, attr)
    }

    /// Bind the target's right edge to the guide.
    pub fn align_right(&mut self, target: &Bounds) -> Result<&mut Self, LayoutError> {
        let attr = target.right();
        self.bind(target, attr)
    }

    /// Bind the target's horizontal center to the guide.
    pub fn align_center(&mut self, target: &Bounds) -> Result<&mut Self, LayoutError> {
        let attr = target.center_x();
        self.bind(target, attr)
    }

    /// Make the guide follow the target's left edge. At most one follow per
    /// guide.
    pub fn follow_left(&mut self, target: &Bounds) -> Result<&mut Self, LayoutError> {
        if self.followed {
            return Err(ConfigError::GuideAlreadyFollows {
                guide: self.variable.name().to_string(),
            }
            .into());
        }
        self.ctx
            .submit_for_hint(&self.id, eq(self.variable.clone(), target.x()).strong())?;
        self.followed = true;
        self.targets.push(target.clone());
        Ok(self)
    }

    /// Stack every bound target vertically with the default gap.
    pub fn arrange(&mut self) -> Result<&mut Self, LayoutError> {
        self.arrange_with(DEFAULT_GAP)
    }

    /// Stack every bound target vertically with the given gap.
    pub fn arrange_with(&mut self, gap: f64) -> Result<&mut Self, LayoutError> {
        for i in 1..self.targets.len() {
            let spec = eq(
                self.targets[i].y(),
                self.targets[i - 1].bottom() + gap,
            )
            .medium();
            self.ctx.submit_for_hint(&self.id, spec)?;
        }
        Ok(self)
    }
}

/// A horizontal guide: one shared y-coordinate.
pub struct GuideY<'a> {
    ctx: &'a mut LayoutContext,
    id: HintId,
    variable: Variable,
    targets: Vec<Bounds>,
    followed: bool,
}

impl<'a> GuideY<'a> {
    pub(crate) fn create(ctx: &'a mut LayoutContext) -> Result<Self, LayoutError> {
        let (id, variable) = ctx.register_hint_with("guide_y", |scope| {
            let variable = scope.hint_variable(Some("pos"))?;
            Ok((scope.id().clone(), variable))
        })?;
        Ok(Self {
            ctx,
            id,
            variable,
            targets: Vec::new(),
            followed: false,
        })
    }

    /// The underlying hint variable, for custom constraints.
    pub fn variable(&self) -> Variable {
        self.variable.clone()
    }

    pub fn id(&self) -> &HintId {
        &self.id
    }

    fn bind(&mut self, target: &Bounds, attr: Variable) -> Result<&mut Self, LayoutError> {
        self.ctx
            .submit_for_hint(&self.id, eq(attr, self.variable.clone()).strong())?;
        self.targets.push(target.clone());
        Ok(self)
    }

    /// Bind the target's top edge to the guide.
    pub fn align_top(&mut self, target: &Bounds) -> Result<&mut Self, LayoutError> {
        let attr = target.y();
        self.bind(target, attr)
    }

    /// Bind the target's bottom edge to the guide.
    pub fn align_bottom(&mut self, target: &Bounds) -> Result<&mut Self, LayoutError> {
        let attr = target.bottom();
        self.bind(target, attr)
    }

    /// Bind the target's vertical center to the guide.
    pub fn align_center(&mut self, target: &Bounds) -> Result<&mut Self, LayoutError> {
        let attr = target.center_y();
        self.bind(target, attr)
    }

    /// Make the guide follow the target's top edge. At most one follow per
    /// guide.
    pub fn follow_top(&mut self, target: &Bounds) -> Result<&mut Self, LayoutError> {
        if self.followed {
            return Err(ConfigError::GuideAlreadyFollows {
                guide: self.variable.name().to_string(),
            }
            .into());
        }
        self.ctx
            .submit_for_hint(&self.id, eq(self.variable.clone(), target.y()).strong())?;
        self.followed = true;
        self.targets.push(target.clone());
        Ok(self)
    }

    /// Arrange every bound target horizontally with the default gap.
    pub fn arrange(&mut self) -> Result<&mut Self, LayoutError> {
        self.arrange_with(DEFAULT_GAP)
    }

    /// Arrange every bound target horizontally with the given gap.
    pub fn arrange_with(&mut self, gap: f64) -> Result<&mut Self, LayoutError> {
        for i in 1..self.targets.len() {
            let spec = eq(
                self.targets[i].x(),
                self.targets[i - 1].right() + gap,
            )
            .medium();
            self.ctx.submit_for_hint(&self.id, spec)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::POSITION_TOLERANCE;

    fn sized(ctx: &mut LayoutContext, prefix: &str, width: f64, height: f64) -> Bounds {
        let bounds = ctx.create_bounds(prefix).unwrap();
        ctx.submit(eq(bounds.width(), width)).unwrap();
        ctx.submit(eq(bounds.height(), height)).unwrap();
        bounds
    }

    #[test]
    fn test_y_guide_aligns_and_arranges() {
        let mut ctx = LayoutContext::new();
        let a = sized(&mut ctx, "a", 50.0, 30.0);
        let b = sized(&mut ctx, "b", 40.0, 60.0);

        let guide_var = {
            let mut guide = ctx.guide_y().unwrap();
            guide
                .align_top(&a)
                .unwrap()
                .align_bottom(&b)
                .unwrap()
                .arrange()
                .unwrap();
            guide.variable()
        };
        ctx.solve_and_apply().unwrap();

        let pos = ctx.value_of(&guide_var);
        let (ra, rb) = (ctx.rect_of(&a), ctx.rect_of(&b));
        assert!((ra.y - pos).abs() < POSITION_TOLERANCE);
        assert!((rb.bottom() - pos).abs() < POSITION_TOLERANCE);
        assert!((rb.x - (ra.right() + DEFAULT_GAP)).abs() < POSITION_TOLERANCE);
    }

    #[test]
    fn test_x_guide_arranges_vertically() {
        let mut ctx = LayoutContext::new();
        let a = sized(&mut ctx, "a", 50.0, 30.0);
        let b = sized(&mut ctx, "b", 50.0, 45.0);

        {
            let mut guide = ctx.guide_x().unwrap();
            guide
                .align_left(&a)
                .unwrap()
                .align_left(&b)
                .unwrap()
                .arrange_with(15.0)
                .unwrap();
        }
        ctx.solve_and_apply().unwrap();

        let (ra, rb) = (ctx.rect_of(&a), ctx.rect_of(&b));
        assert!((rb.x - ra.x).abs() < POSITION_TOLERANCE);
        assert!((rb.y - (ra.bottom() + 15.0)).abs() < POSITION_TOLERANCE);
    }

    #[test]
    fn test_follow_is_single_writer() {
        let mut ctx = LayoutContext::new();
        let a = ctx.create_bounds("a").unwrap();
        let b = ctx.create_bounds("b").unwrap();

        let mut guide = ctx.guide_x().unwrap();
        guide.follow_left(&a).unwrap();
        let err = guide.follow_left(&b).map(|_| ());
        assert!(matches!(
            err,
            Err(LayoutError::Config(ConfigError::GuideAlreadyFollows { .. }))
        ));
    }

    #[test]
    fn test_guide_follows_target() {
        let mut ctx = LayoutContext::new();
        let a = ctx.create_bounds("a").unwrap();
        ctx.submit(eq(a.x(), 42.0)).unwrap();

        let guide_var = {
            let mut guide = ctx.guide_x().unwrap();
            guide.follow_left(&a).unwrap();
            guide.variable()
        };
        ctx.solve_and_apply().unwrap();
        assert!((ctx.value_of(&guide_var) - 42.0).abs() < POSITION_TOLERANCE);
    }

    #[test]
    fn test_guide_registration_owns_variable() {
        let mut ctx = LayoutContext::new();
        let (id, name) = {
            let guide = ctx.guide_x().unwrap();
            (guide.id().clone(), guide.variable().name().to_string())
        };
        assert_eq!(name, "hint:guide_x/0_pos");
        let registration = ctx.hints().get(&id).unwrap();
        assert_eq!(registration.variables().len(), 1);
    }
}
