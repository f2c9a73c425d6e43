//! End-to-end diagram construction through the public API.

use std::cell::Cell;
use std::rc::Rc;

use trellis_layout::constraint::{eq, ge};
use trellis_layout::{
    AlignAttr, Arrange, BoundsCtx, CharacValue, Enclose, LayoutContext, LayoutError,
    RegistrationState, Symbol, POSITION_TOLERANCE,
};

/// A box with a preferred size it can grow beyond.
struct BoxSymbol {
    min_width: f64,
    min_height: f64,
}

impl Symbol for BoxSymbol {
    fn ensure_layout_bounds(&self, ctx: &mut BoundsCtx<'_>) -> Result<(), LayoutError> {
        let bounds = ctx.bounds().clone();
        ctx.submit(ge(bounds.width(), self.min_width).strong())?;
        ctx.submit(ge(bounds.height(), self.min_height).strong())?;
        ctx.submit(eq(bounds.width(), self.min_width).weak())?;
        ctx.submit(eq(bounds.height(), self.min_height).weak())?;
        Ok(())
    }

    fn extension_fields(&self) -> Vec<(String, CharacValue)> {
        vec![("shape".to_string(), CharacValue::Text("box".to_string()))]
    }
}

/// A container whose inner item area is inset from its bounds.
struct BoundarySymbol {
    inset: f64,
}

impl Symbol for BoundarySymbol {
    fn needs_item_bounds(&self) -> bool {
        true
    }

    fn ensure_layout_bounds(&self, ctx: &mut BoundsCtx<'_>) -> Result<(), LayoutError> {
        let bounds = ctx.bounds().clone();
        let item = ctx
            .item_bounds()
            .expect("boundary symbols request item bounds")
            .clone();
        ctx.submit(eq(item.x(), bounds.x() + self.inset))?;
        ctx.submit(eq(item.y(), bounds.y() + self.inset))?;
        ctx.submit(eq(item.right(), bounds.right() - self.inset))?;
        ctx.submit(eq(item.bottom(), bounds.bottom() - self.inset))?;
        Ok(())
    }
}

#[test]
fn test_factory_symbols_arrange_and_align() {
    let mut ctx = LayoutContext::new();
    ctx.register_factory("basic", "box", || {
        Box::new(BoxSymbol {
            min_width: 60.0,
            min_height: 40.0,
        })
    })
    .unwrap();

    let a = ctx.add_symbol("basic", "box").unwrap();
    let b = ctx.add_symbol("basic", "box").unwrap();
    assert_eq!(a.as_str(), "basic:box/0");
    assert_eq!(b.as_str(), "basic:box/1");

    let ba = ctx.symbol_bounds(&a).unwrap();
    let bb = ctx.symbol_bounds(&b).unwrap();
    ctx.arrange_horizontal(&[&ba, &bb], 20.0).unwrap();
    ctx.align(AlignAttr::Top, &[&ba, &bb]).unwrap();
    ctx.solve_and_apply().unwrap();

    let ra = ctx.symbol_rect(&a).unwrap();
    let rb = ctx.symbol_rect(&b).unwrap();
    assert!((ra.width - 60.0).abs() < POSITION_TOLERANCE);
    assert!((rb.x - (ra.right() + 20.0)).abs() < POSITION_TOLERANCE);
    assert!((rb.y - ra.y).abs() < POSITION_TOLERANCE);

    let registration = ctx.symbols().find_by_id(&a).unwrap();
    assert_eq!(registration.state(), RegistrationState::Built);
    let characs = registration.characs().unwrap();
    assert_eq!(
        characs.extension("shape"),
        Some(&CharacValue::Text("box".to_string()))
    );

    let rects = ctx.resolved_rects();
    assert_eq!(rects.len(), 2);
    assert_eq!(rects[0].0, a);
    assert_eq!(rects[1].0, b);
}

#[test]
fn test_nested_enclosures_solve_together() {
    let mut ctx = LayoutContext::new();
    ctx.register_factory("basic", "box", || {
        Box::new(BoxSymbol {
            min_width: 50.0,
            min_height: 30.0,
        })
    })
    .unwrap();

    let leaf_a = ctx.add_symbol("basic", "box").unwrap();
    let leaf_b = ctx.add_symbol("basic", "box").unwrap();
    let inner = ctx.create_bounds("inner").unwrap();
    let outer = ctx.create_bounds("outer").unwrap();

    let la = ctx.symbol_bounds(&leaf_a).unwrap();
    let lb = ctx.symbol_bounds(&leaf_b).unwrap();
    ctx.arrange_horizontal(&[&la, &lb], 10.0).unwrap();
    ctx.align(AlignAttr::Top, &[&la, &lb]).unwrap();

    Enclose::new(&inner, &[&la, &lb])
        .with_padding(5.0)
        .register(&mut ctx)
        .unwrap();
    Enclose::new(&outer, &[&inner])
        .with_padding(8.0)
        .register(&mut ctx)
        .unwrap();

    ctx.solve_and_apply().unwrap();

    let (ra, rb) = (ctx.rect_of(&la), ctx.rect_of(&lb));
    let (ri, ro) = (ctx.rect_of(&inner), ctx.rect_of(&outer));

    // Inner hugs the two leaves.
    assert!((ri.x - (ra.x.min(rb.x) - 5.0)).abs() < POSITION_TOLERANCE);
    assert!((ri.right() - (ra.right().max(rb.right()) + 5.0)).abs() < POSITION_TOLERANCE);
    // Outer hugs inner.
    assert!((ro.x - (ri.x - 8.0)).abs() < POSITION_TOLERANCE);
    assert!((ro.bottom() - (ri.bottom() + 8.0)).abs() < POSITION_TOLERANCE);
    // Containment inequalities hold at every level.
    assert!(ra.y >= ri.y + 5.0 - POSITION_TOLERANCE);
    assert!(ri.y >= ro.y + 8.0 - POSITION_TOLERANCE);

    // Render order: containers beneath their children.
    let enclosures = ctx.hints().enclosures();
    assert_eq!(enclosures.len(), 2);
    assert_eq!(enclosures[0].container, "inner");
    assert_eq!(enclosures[1].container, "outer");
}

#[test]
fn test_item_bounds_follow_symbol() {
    let mut ctx = LayoutContext::new();
    let id = ctx
        .add_symbol_with("basic", "boundary", Box::new(BoundarySymbol { inset: 6.0 }))
        .unwrap();

    let bounds = ctx.symbol_bounds(&id).unwrap();
    ctx.submit(eq(bounds.x(), 10.0)).unwrap();
    ctx.submit(eq(bounds.y(), 10.0)).unwrap();
    ctx.submit(eq(bounds.width(), 100.0)).unwrap();
    ctx.submit(eq(bounds.height(), 80.0)).unwrap();
    ctx.solve_and_apply().unwrap();

    let registration = ctx.symbols().find_by_id(&id).unwrap();
    let item = registration.characs().unwrap().item_bounds().unwrap();
    let rect = ctx.rect_of(item);
    assert!((rect.x - 16.0).abs() < POSITION_TOLERANCE);
    assert!((rect.width - 88.0).abs() < POSITION_TOLERANCE);
}

struct CountingSymbol {
    calls: Rc<Cell<u32>>,
}

impl Symbol for CountingSymbol {
    fn ensure_layout_bounds(&self, _ctx: &mut BoundsCtx<'_>) -> Result<(), LayoutError> {
        self.calls.set(self.calls.get() + 1);
        Ok(())
    }
}

#[test]
fn test_layout_bounds_hook_runs_exactly_once() {
    let calls = Rc::new(Cell::new(0));
    let mut ctx = LayoutContext::new();
    ctx.add_symbol_with(
        "basic",
        "counter",
        Box::new(CountingSymbol {
            calls: calls.clone(),
        }),
    )
    .unwrap();
    ctx.solve_and_apply().unwrap();
    assert_eq!(calls.get(), 1);
}

struct FailingSymbol;

impl Symbol for FailingSymbol {
    fn ensure_layout_bounds(&self, ctx: &mut BoundsCtx<'_>) -> Result<(), LayoutError> {
        let bounds = ctx.bounds().clone();
        ctx.submit(eq(bounds.width(), 10.0))?;
        // A second required pin on the same variable conflicts.
        ctx.submit(eq(bounds.width(), 20.0))?;
        Ok(())
    }
}

#[test]
fn test_failed_registration_is_atomic() {
    let mut ctx = LayoutContext::new();
    let constraints_before = ctx.constraint_count();

    let err = ctx.add_symbol_with("basic", "broken", Box::new(FailingSymbol));
    assert!(matches!(err, Err(LayoutError::Solver(_))));

    // Nothing registered, every submitted constraint withdrawn.
    assert!(ctx.symbols().is_empty());
    assert_eq!(ctx.constraint_count(), constraints_before);

    // The context stays usable and the namespace keeps sequencing.
    let id = ctx
        .add_symbol_with(
            "basic",
            "box",
            Box::new(BoxSymbol {
                min_width: 10.0,
                min_height: 10.0,
            }),
        )
        .unwrap();
    assert_eq!(id.as_str(), "basic:box/1");
}

#[test]
fn test_solve_and_apply_twice_is_stable() {
    let mut ctx = LayoutContext::new();
    ctx.register_factory("basic", "box", || {
        Box::new(BoxSymbol {
            min_width: 45.0,
            min_height: 25.0,
        })
    })
    .unwrap();
    let a = ctx.add_symbol("basic", "box").unwrap();
    let b = ctx.add_symbol("basic", "box").unwrap();
    let ba = ctx.symbol_bounds(&a).unwrap();
    let bb = ctx.symbol_bounds(&b).unwrap();
    Arrange::vertical(&[&ba, &bb])
        .with_gap(12.0)
        .register(&mut ctx)
        .unwrap();

    ctx.solve_and_apply().unwrap();
    let first = ctx.resolved_rects();
    ctx.solve_and_apply().unwrap();
    let second = ctx.resolved_rects();

    for ((id_a, rect_a), (id_b, rect_b)) in first.iter().zip(second.iter()) {
        assert_eq!(id_a, id_b);
        assert_eq!(rect_a, rect_b);
    }
}

#[cfg(feature = "serde")]
#[test]
fn test_rect_and_characs_serialize() {
    use trellis_layout::Rect;

    let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
    let json = serde_json::to_value(rect).unwrap();
    assert_eq!(json["width"], 3.0);

    let value = CharacValue::Text("box".to_string());
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(json, serde_json::json!({ "Text": "box" }));
}
