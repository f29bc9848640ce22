use crate::kernels::params::StencilParams;
use crate::pipeline::key::{PrimitiveKind, WindingRule};

type P2 = [f32; 2];

pub(crate) fn scan(p0: P2, p1: P2, y: f32) -> f32 {
    p0[0] + (y - p0[1]) * (p1[0] - p0[0]) / (p1[1] - p0[1])
}

/// Half-open `[xl, xr)` span of the triangle `q` (sorted by `y`) on row `y`.
pub(crate) fn row_span(q: [P2; 3], y: f32) -> (f32, f32) {
    let long = scan(q[0], q[2], y);
    let short = if y < q[1][1] {
        scan(q[0], q[1], y)
    } else {
        scan(q[1], q[2], y)
    };
    (long.min(short), long.max(short))
}

pub(crate) fn barycentric(p0: P2, p1: P2, p2: P2, q: P2) -> Option<[f32; 3]> {
    let det = (p1[1] - p2[1]) * (p0[0] - p2[0]) + (p2[0] - p1[0]) * (p0[1] - p2[1]);
    if det == 0.0 {
        return None;
    }
    let b0 = ((p1[1] - p2[1]) * (q[0] - p2[0]) + (p2[0] - p1[0]) * (q[1] - p2[1])) / det;
    let b1 = ((p2[1] - p0[1]) * (q[0] - p2[0]) + (p0[0] - p2[0]) * (q[1] - p2[1])) / det;
    Some([b0, b1, 1.0 - b0 - b1])
}

/// Stencil slot hit by invocation `(gx, gy)`, if any.
///
/// Rows are half-open `[q0.y, q2.y)`; within a row the sample `x` must lie in the row's
/// half-open span, so an edge shared by two primitives covers each sample once.
pub(crate) fn sample_position(p: &StencilParams, gx: u32, gy: u32) -> Option<(u32, u32)> {
    let y = p.y_start + gy;
    if y >= p.height {
        return None;
    }
    let yf = y as f32;
    if yf < p.q0[1] || yf >= p.q2[1] {
        return None;
    }
    let (xl, xr) = row_span([p.q0, p.q1, p.q2], yf);
    let x = xl.ceil().max(0.0) + gx as f32;
    if x >= xr || x >= p.width as f32 {
        return None;
    }
    Some((x as u32, y))
}

/// Whether the curve test of `kind` passes at a sample already inside the hull triangle.
pub(crate) fn curve_inside(kind: PrimitiveKind, p: &StencilParams, x: f32, y: f32) -> bool {
    match kind {
        PrimitiveKind::Triangle => true,
        PrimitiveKind::Quadratic => match barycentric(p.p0, p.p1, p.p2, [x, y]) {
            Some(b) => {
                let s = 0.5 * b[1] + b[2];
                s * s < b[2]
            }
            None => false,
        },
        PrimitiveKind::Cubic => match barycentric(p.p0, p.p1, p.p2, [x, y]) {
            Some(b) => {
                let v = [0, 1, 2].map(|i| b[0] * p.v0[i] + b[1] * p.v1[i] + b[2] * p.v2[i]);
                v[0] * v[0] * v[0] < v[1] * v[2]
            }
            None => false,
        },
    }
}

/// Coverage in `[0, 1]` of one subsample with accumulated winding `s`.
pub(crate) fn resolve(winding: WindingRule, s: i32) -> f32 {
    match winding {
        WindingRule::NonZero => s.unsigned_abs().min(1) as f32,
        WindingRule::EvenOdd => (s.unsigned_abs() & 1) as f32,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernels/coverage.rs"]
mod tests;
