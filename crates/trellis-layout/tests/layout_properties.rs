//! Property tests for solved-geometry invariants.

use proptest::prelude::*;

use trellis_layout::constraint::{eq, Bounds};
use trellis_layout::{Arrange, Enclose, LayoutContext, POSITION_TOLERANCE};

fn sized(ctx: &mut LayoutContext, prefix: &str, width: f64, height: f64) -> Bounds {
    let bounds = ctx.create_bounds(prefix).unwrap();
    ctx.submit(eq(bounds.width(), width)).unwrap();
    ctx.submit(eq(bounds.height(), height)).unwrap();
    bounds
}

proptest! {
    #[test]
    fn arrange_preserves_gaps_and_rectangle_invariants(
        sizes in prop::collection::vec((1.0f64..300.0, 1.0f64..200.0), 2..6),
        gap in 0.0f64..60.0,
    ) {
        let mut ctx = LayoutContext::new();
        let mut bounds = Vec::new();
        for (i, (w, h)) in sizes.iter().enumerate() {
            bounds.push(sized(&mut ctx, &format!("n{}", i), *w, *h));
        }
        let targets: Vec<&Bounds> = bounds.iter().collect();
        Arrange::horizontal(&targets)
            .with_gap(gap)
            .register(&mut ctx)
            .unwrap();
        ctx.solve_and_apply().unwrap();

        for pair in bounds.windows(2) {
            let prev = ctx.rect_of(&pair[0]);
            let next = ctx.rect_of(&pair[1]);
            prop_assert!((next.x - (prev.right() + gap)).abs() < POSITION_TOLERANCE);
        }
        for b in &bounds {
            let rect = ctx.rect_of(b);
            let right = ctx.value_of(&b.right());
            let bottom = ctx.value_of(&b.bottom());
            let center_x = ctx.value_of(&b.center_x());
            prop_assert!((right - (rect.x + rect.width)).abs() < POSITION_TOLERANCE);
            prop_assert!((bottom - (rect.y + rect.height)).abs() < POSITION_TOLERANCE);
            prop_assert!((center_x - (rect.x + rect.width / 2.0)).abs() < POSITION_TOLERANCE);
            prop_assert!(rect.width >= -POSITION_TOLERANCE);
            prop_assert!(rect.height >= -POSITION_TOLERANCE);
        }
    }

    #[test]
    fn enclose_bounds_children_with_padding(
        children in prop::collection::vec(
            (0.0f64..400.0, 0.0f64..400.0, 5.0f64..80.0, 5.0f64..80.0),
            1..5,
        ),
        padding in 0.0f64..25.0,
    ) {
        let mut ctx = LayoutContext::new();
        let container = ctx.create_bounds("container").unwrap();
        let mut bounds = Vec::new();
        for (i, (x, y, w, h)) in children.iter().enumerate() {
            let b = sized(&mut ctx, &format!("child{}", i), *w, *h);
            ctx.submit(eq(b.x(), *x)).unwrap();
            ctx.submit(eq(b.y(), *y)).unwrap();
            bounds.push(b);
        }
        let targets: Vec<&Bounds> = bounds.iter().collect();
        Enclose::new(&container, &targets)
            .with_padding(padding)
            .register(&mut ctx)
            .unwrap();
        ctx.solve_and_apply().unwrap();

        let rc = ctx.rect_of(&container);
        let mut tight = ctx.rect_of(&bounds[0]);
        for b in &bounds {
            let rect = ctx.rect_of(b);
            tight = tight.union(&rect);
            prop_assert!(rect.x >= rc.x + padding - POSITION_TOLERANCE);
            prop_assert!(rect.right() <= rc.right() - padding + POSITION_TOLERANCE);
            prop_assert!(rect.y >= rc.y + padding - POSITION_TOLERANCE);
            prop_assert!(rect.bottom() <= rc.bottom() - padding + POSITION_TOLERANCE);
        }
        // Shrink-to-fit: the free container hugs the tight bounding box.
        prop_assert!((rc.x - (tight.x - padding)).abs() < POSITION_TOLERANCE);
        prop_assert!((rc.right() - (tight.right() + padding)).abs() < POSITION_TOLERANCE);
    }
}
