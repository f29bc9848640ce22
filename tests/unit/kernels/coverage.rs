use super::*;

fn tri(p0: [f32; 2], p1: [f32; 2], p2: [f32; 2]) -> StencilParams {
    let mut q = [p0, p1, p2];
    q.sort_by(|a, b| a[1].total_cmp(&b[1]));
    StencilParams {
        p0,
        p1,
        p2,
        winding: 1,
        width: 16,
        height: 16,
        y_start: 0,
        q0: q[0],
        q1: q[1],
        q2: q[2],
        ..StencilParams::default()
    }
}

#[test]
fn row_span_orders_edges() {
    let q = [[0.0, 0.0], [8.0, 4.0], [0.0, 8.0]];
    let (l, r) = row_span(q, 4.0);
    assert_eq!(l, 0.0);
    assert_eq!(r, 8.0);
    let (l, r) = row_span(q, 2.0);
    assert_eq!((l, r), (0.0, 4.0));
}

#[test]
fn sample_position_is_half_open() {
    let p = tri([0.0, 0.0], [4.0, 0.0], [0.0, 4.0]);
    // Row 0 spans [0, 4): samples 0..=3.
    assert_eq!(sample_position(&p, 0, 0), Some((0, 0)));
    assert_eq!(sample_position(&p, 3, 0), Some((3, 0)));
    assert_eq!(sample_position(&p, 4, 0), None);
    // Bottom row is excluded.
    assert_eq!(sample_position(&p, 0, 4), None);
}

#[test]
fn sample_position_clamps_to_width() {
    let mut p = tri([-4.0, 0.0], [20.0, 0.0], [-4.0, 4.0]);
    p.width = 8;
    assert_eq!(sample_position(&p, 0, 0), Some((0, 0)));
    assert_eq!(sample_position(&p, 7, 0), Some((7, 0)));
    assert_eq!(sample_position(&p, 8, 0), None);
}

#[test]
fn barycentric_recovers_vertices() {
    let (a, b, c) = ([0.0, 0.0], [4.0, 0.0], [0.0, 4.0]);
    let w = barycentric(a, b, c, [4.0, 0.0]).unwrap();
    assert!((w[1] - 1.0).abs() < 1e-6);
    assert!(barycentric(a, a, c, [1.0, 1.0]).is_none());
}

#[test]
fn quadratic_excludes_hull_outside_curve() {
    // Control point at (4,0): the curve bows toward it.
    let p = tri([0.0, 4.0], [4.0, 0.0], [8.0, 4.0]);
    // Deep inside the hull near the control point, outside the curve.
    assert!(!curve_inside(PrimitiveKind::Quadratic, &p, 4.0, 0.5));
    // Near the chord, inside the curve.
    assert!(curve_inside(PrimitiveKind::Quadratic, &p, 4.0, 3.5));
}

#[test]
fn winding_rules_resolve_counts() {
    assert_eq!(resolve(WindingRule::NonZero, -3), 1.0);
    assert_eq!(resolve(WindingRule::NonZero, 0), 0.0);
    assert_eq!(resolve(WindingRule::EvenOdd, 2), 0.0);
    assert_eq!(resolve(WindingRule::EvenOdd, -3), 1.0);
}

// k = b1, l = 1, m = b0 across the hull, so the curve is b1^3 = b0.
fn cubic(k1: f32) -> StencilParams {
    StencilParams {
        v0: [0.0, 1.0, 1.0],
        v1: [k1, 1.0, 0.0],
        v2: [0.0, 1.0, 0.0],
        ..tri([0.0, 0.0], [8.0, 0.0], [0.0, 8.0])
    }
}

#[test]
fn cubic_implicit_test_splits_the_hull() {
    let p = cubic(1.0);
    assert!(curve_inside(PrimitiveKind::Cubic, &p, 2.0, 2.0));
    assert!(curve_inside(PrimitiveKind::Cubic, &p, 5.0, 1.0));
    assert!(curve_inside(PrimitiveKind::Cubic, &p, 1.0, 6.0));
    // Inside the hull, past the curve.
    assert!(!curve_inside(PrimitiveKind::Cubic, &p, 6.0, 1.0));
    assert!(!curve_inside(PrimitiveKind::Cubic, &p, 5.0, 2.0));
}

#[test]
fn cubic_negated_k_flips_the_far_side() {
    let p = cubic(-1.0);
    assert!(curve_inside(PrimitiveKind::Cubic, &p, 6.0, 1.0));
    assert!(curve_inside(PrimitiveKind::Cubic, &p, 2.0, 2.0));
    // Zero coefficients leave nothing inside.
    let flat = tri([0.0, 0.0], [8.0, 0.0], [0.0, 8.0]);
    assert!(!curve_inside(PrimitiveKind::Cubic, &flat, 2.0, 2.0));
}
