use crate::foundation::core::Point;
use std::ops::Range;

/// Tolerance used by geometry degeneracy checks.
pub(crate) const GEOMETRY_EPSILON: f64 = 1e-9;

pub(crate) fn almost_zero(v: f64) -> bool {
    v.abs() < GEOMETRY_EPSILON
}

pub(crate) fn almost_equal(a: Point, b: Point) -> bool {
    almost_zero(a.x - b.x) && almost_zero(a.y - b.y)
}

/// X coordinate of the line through `p0` and `p1` on scanline `y`.
pub(crate) fn scan(p0: Point, p1: Point, y: f64) -> f64 {
    let d = p1 - p0;
    p0.x + (y - p0.y) * d.x / d.y
}

/// Integer sample positions `s` with `min <= s` and `s < max`, or `s <= max` when `max` is
/// not integral.
pub(crate) fn int_range(min: f64, max: f64) -> Range<i64> {
    let lo = min.ceil();
    let hi = if max.fract() == 0.0 { max } else { max.floor() + 1.0 };
    if lo >= hi || lo.is_nan() || hi.is_nan() {
        return 0..0;
    }
    (lo as i64)..(hi as i64)
}

/// Intersect `r` with `[0, len)`.
pub(crate) fn clamp_range(r: Range<i64>, len: u32) -> Range<i64> {
    let lo = r.start.max(0);
    let hi = r.end.min(i64::from(len));
    if lo >= hi { 0..0 } else { lo..hi }
}

pub(crate) fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

/// Points ordered by ascending `y`, ties keeping their input order.
pub(crate) fn sort_by_y(points: [Point; 3]) -> [Point; 3] {
    let mut q = points;
    q.sort_by(|a, b| a.y.total_cmp(&b.y));
    q
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
