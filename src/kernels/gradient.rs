use crate::foundation::core::MAX_COMPONENTS;
use crate::pipeline::key::SpreadMode;

const EPSILON: f32 = 1e-6;

type P2 = [f32; 2];

fn dot(a: P2, b: P2) -> f32 {
    a[0] * b[0] + a[1] * b[1]
}

fn sub(a: P2, b: P2) -> P2 {
    [a[0] - b[0], a[1] - b[1]]
}

/// Apply a row-major `[a, b, c, d, e, f]` affine map.
pub(crate) fn apply_affine(m: &[f32; 6], p: P2) -> P2 {
    [
        m[0] * p[0] + m[2] * p[1] + m[4],
        m[1] * p[0] + m[3] * p[1] + m[5],
    ]
}

/// Projection of `p` onto the axis `start -> end`.
pub(crate) fn axial_t(p: P2, start: P2, end: P2) -> f32 {
    let a = sub(start, p);
    let b = sub(end, start);
    -dot(a, b) / dot(b, b)
}

/// Largest `t` with `|p - c(t)| = r(t)` that keeps `r(t) >= 0` and honors spread-none
/// cutoffs, or `None` where the gradient is undefined.
pub(crate) fn radial_t(
    p: P2,
    start: P2,
    start_radius: f32,
    end: P2,
    end_radius: f32,
    start_spread: SpreadMode,
    end_spread: SpreadMode,
) -> Option<f32> {
    let p0 = sub(p, start);
    let p1 = sub(start, end);
    let r0 = start_radius;
    let r1 = end_radius - start_radius;

    let a = dot(p1, p1) - r1 * r1;
    let b = 2.0 * (dot(p0, p1) - r0 * r1);
    let c = dot(p0, p0) - r0 * r0;

    let accept = |t: f32| {
        r0 + t * r1 >= 0.0
            && (t >= 0.0 || start_spread != SpreadMode::None)
            && (t <= 1.0 || end_spread != SpreadMode::None)
    };

    if a.abs() < EPSILON {
        if b.abs() < EPSILON {
            return None;
        }
        let t = -c / b;
        return accept(t).then_some(t);
    }

    let (t0, t1) = degree2_roots(b / a, c / a)?;
    match (accept(t0), accept(t1)) {
        (true, true) => Some(t0.max(t1)),
        (true, false) => Some(t0),
        (false, true) => Some(t1),
        (false, false) => None,
    }
}

/// Real roots of `x^2 + b x + c`, a repeated root returned twice.
pub(crate) fn degree2_roots(b: f32, c: f32) -> Option<(f32, f32)> {
    let half = -0.5 * b;
    let disc = half * half - c;
    if disc < 0.0 {
        return None;
    }
    let d = disc.sqrt();
    Some((half - d, half + d))
}

/// Folded gradient parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Folded {
    /// Position to shade, inside `[0, 1]`.
    pub(crate) t: f32,
    /// Whether the shaded color is forced transparent.
    pub(crate) transparent: bool,
}

/// Map `t` into `[0, 1]` under the start and end spread modes.
pub(crate) fn fold(t: f32, start_spread: SpreadMode, end_spread: SpreadMode) -> Folded {
    let at = |t| Folded {
        t,
        transparent: false,
    };
    if (0.0..=1.0).contains(&t) {
        return at(t);
    }
    let i = t.trunc();
    let s = t - i;
    let even = (i as i64) % 2 == 0;
    if t > 1.0 {
        match end_spread {
            SpreadMode::None => Folded {
                t: 1.0,
                transparent: true,
            },
            SpreadMode::Pad => at(1.0),
            SpreadMode::Reflect => at(if even { s } else { 1.0 - s }),
            SpreadMode::Repeat => at(s),
        }
    } else {
        match start_spread {
            SpreadMode::None => Folded {
                t: 0.0,
                transparent: true,
            },
            SpreadMode::Pad => at(0.0),
            SpreadMode::Reflect => at(if even { -s } else { 1.0 + s }),
            SpreadMode::Repeat => at(1.0 + s),
        }
    }
}

/// Gradient stop as read by kernels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct KernelStop {
    pub(crate) offset: f32,
    pub(crate) color: [f32; MAX_COMPONENTS],
}

/// Color of sorted `stops` at `t`, written into `out`.
pub(crate) fn shade(stops: &[KernelStop], t: f32, out: &mut [f32]) {
    let n = out.len();
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        out.fill(0.0);
        return;
    };
    if t <= first.offset {
        out.copy_from_slice(&first.color[..n]);
        return;
    }
    if t >= last.offset {
        out.copy_from_slice(&last.color[..n]);
        return;
    }
    for pair in stops.windows(2) {
        let (l, r) = (&pair[0], &pair[1]);
        if l.offset != r.offset && l.offset <= t && t <= r.offset {
            let u = (t - l.offset) / (r.offset - l.offset);
            for (i, o) in out.iter_mut().enumerate() {
                *o = l.color[i] + u * (r.color[i] - l.color[i]);
            }
            return;
        }
    }
    out.copy_from_slice(&last.color[..n]);
}

/// Final gradient pixel for an optional raw `t`.
pub(crate) fn gradient_pixel(
    stops: &[KernelStop],
    t: Option<f32>,
    start_spread: SpreadMode,
    end_spread: SpreadMode,
    out: &mut [f32],
) {
    let Some(t) = t.filter(|t| t.is_finite()) else {
        out.fill(0.0);
        return;
    };
    let folded = fold(t, start_spread, end_spread);
    shade(stops, folded.t, out);
    if folded.transparent {
        let last = out.len() - 1;
        out[last] = 0.0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernels/gradient.rs"]
mod tests;
