//! WGSL sources for every [`PipelineKey`].
//!
//! Each program gets a prelude with its specialization constants, the parameter block
//! accessors and the grid-bounded entry point; the kernel body defines `run(x, y)`. Binding 0
//! is the parameter block: two words of grid size followed by the dispatch's parameter words.
//! Bindings 1.. are the dispatch's buffers in order.

use std::fmt::Write as _;

use crate::pipeline::key::{GradientKind, PipelineKey};

const PRELUDE: &str = r#"
@group(0) @binding(0) var<storage, read> params: array<u32>;

const PI: f32 = 3.141592653589793;

fn pu(i: u32) -> u32 {
    return params[i + 2u];
}

fn pf(i: u32) -> f32 {
    return bitcast<f32>(params[i + 2u]);
}

fn pi(i: u32) -> i32 {
    return bitcast<i32>(params[i + 2u]);
}

fn pt(i: u32) -> vec2<f32> {
    return vec2<f32>(pf(i), pf(i + 1u));
}

fn apply_affine(p: vec2<f32>) -> vec2<f32> {
    return vec2<f32>(
        pf(0u) * p.x + pf(2u) * p.y + pf(4u),
        pf(1u) * p.x + pf(3u) * p.y + pf(5u),
    );
}

@compute @workgroup_size(WG, WG, 1)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    if (gid.x >= params[0] || gid.y >= params[1]) {
        return;
    }
    run(gid.x, gid.y);
}
"#;

const STENCIL: &str = r#"
@group(0) @binding(1) var<storage, read_write> stencil: array<atomic<i32>>;

fn scan(a: vec2<f32>, b: vec2<f32>, y: f32) -> f32 {
    return a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
}

fn barycentric(p: vec2<f32>) -> vec4<f32> {
    let p0 = pt(0u);
    let p1 = pt(2u);
    let p2 = pt(4u);
    let det = (p1.y - p2.y) * (p0.x - p2.x) + (p2.x - p1.x) * (p0.y - p2.y);
    if (det == 0.0) {
        return vec4<f32>(0.0);
    }
    let b0 = ((p1.y - p2.y) * (p.x - p2.x) + (p2.x - p1.x) * (p.y - p2.y)) / det;
    let b1 = ((p2.y - p0.y) * (p.x - p2.x) + (p0.x - p2.x) * (p.y - p2.y)) / det;
    return vec4<f32>(b0, b1, 1.0 - b0 - b1, 1.0);
}

fn inside(x: f32, y: f32) -> bool {
    if (KIND == 0u) {
        return true;
    }
    let b = barycentric(vec2<f32>(x, y));
    if (b.w == 0.0) {
        return false;
    }
    if (KIND == 1u) {
        let s = 0.5 * b.y + b.z;
        return s * s < b.z;
    }
    let v = b.x * vec3<f32>(pf(6u), pf(7u), pf(8u))
        + b.y * vec3<f32>(pf(9u), pf(10u), pf(11u))
        + b.z * vec3<f32>(pf(12u), pf(13u), pf(14u));
    return v.x * v.x * v.x < v.y * v.z;
}

fn run(gx: u32, gy: u32) {
    let width = pu(16u);
    let height = pu(17u);
    let y = pu(18u) + gy;
    if (y >= height) {
        return;
    }
    let q0 = pt(19u);
    let q1 = pt(21u);
    let q2 = pt(23u);
    let yf = f32(y);
    if (yf < q0.y || yf >= q2.y) {
        return;
    }
    let long_x = scan(q0, q2, yf);
    var short_x = 0.0;
    if (yf < q1.y) {
        short_x = scan(q0, q1, yf);
    } else {
        short_x = scan(q1, q2, yf);
    }
    let xl = min(long_x, short_x);
    let xr = max(long_x, short_x);
    let xf = max(ceil(xl), 0.0) + f32(gx);
    if (xf >= xr || xf >= f32(width)) {
        return;
    }
    if (!inside(xf, yf)) {
        return;
    }
    atomicAdd(&stencil[y * width + u32(xf)], pi(15u));
}
"#;

const FILL: &str = r#"
@group(0) @binding(1) var<storage, read_write> dst: array<f32>;
@group(0) @binding(2) var<storage, read> stencil: array<i32>;

fn resolve(s: i32) -> f32 {
    let a = u32(abs(s));
    if (WINDING == 0u) {
        return f32(min(a, 1u));
    }
    return f32(a & 1u);
}

fn run(gx: u32, gy: u32) {
    let width = pu(18u);
    let aa = pu(19u);
    let x = pu(16u) + gx;
    let y = pu(17u) + gy;
    if (x >= width) {
        return;
    }
    let row = width * aa;
    var sum = 0.0;
    for (var j = 0u; j < aa; j++) {
        for (var i = 0u; i < aa; i++) {
            sum += resolve(stencil[(y * aa + j) * row + x * aa + i]);
        }
    }
    let index = y * width + x;
    let coverage = sum / f32(aa * aa) * clip_coverage(index);
    if (coverage > 0.0) {
        let base = index * N;
        for (var c = 0u; c < N - 1u; c++) {
            dst[base + c] = pf(c);
        }
        dst[base + N - 1u] = pf(N - 1u) * coverage;
    }
}
"#;

const BLEND: &str = r#"
@group(0) @binding(1) var<storage, read> src: array<f32>;
@group(0) @binding(2) var<storage, read_write> dst: array<f32>;

fn overlay(d: f32, s: f32) -> f32 {
    if (d < 0.5) {
        return 2.0 * d * s;
    }
    return 1.0 - 2.0 * (1.0 - d) * (1.0 - s);
}

fn blend_channel(d: f32, s: f32) -> f32 {
    var r = s;
    switch BLEND_MODE {
        case 1u: { r = d * s; }
        case 2u: { r = d + s - d * s; }
        case 3u: { r = overlay(d, s); }
        case 4u: { r = min(d, s); }
        case 5u: { r = max(d, s); }
        case 6u: {
            if (s < 1.0) {
                r = min(d / (1.0 - s), 1.0);
            } else {
                r = 1.0;
            }
        }
        case 7u: {
            if (s > 0.0) {
                r = 1.0 - min((1.0 - d) / s, 1.0);
            } else {
                r = 0.0;
            }
        }
        case 8u: {
            var db = sqrt(d);
            if (d < 0.25) {
                db = ((16.0 * d - 12.0) * d + 4.0) * d;
            }
            let u = 1.0 - 2.0 * s;
            if (s < 0.5) {
                r = d - u * d * (1.0 - d);
            } else {
                r = d - u * (db - d);
            }
        }
        case 9u: { r = overlay(s, d); }
        case 10u: { r = abs(d - s); }
        case 11u: { r = d + s - 2.0 * d * s; }
        case 12u: { r = max(1.0 - ((1.0 - d) + (1.0 - s)), 0.0); }
        case 13u: { r = min(d + s, 1.0); }
        default: {}
    }
    return r;
}

fn porter_duff(s: f32, sa: f32, d: f32, da: f32) -> f32 {
    var r = 0.0;
    switch COMPOSITING {
        case 1u: { r = s; }
        case 2u: { r = s + d * (1.0 - sa); }
        case 3u: { r = s * da; }
        case 4u: { r = s * (1.0 - da); }
        case 5u: { r = s * da + d * (1.0 - sa); }
        case 6u: { r = s * (1.0 - da) + d; }
        case 7u: { r = d * sa; }
        case 8u: { r = d * (1.0 - sa); }
        case 9u: { r = s * (1.0 - da) + d * sa; }
        case 10u: { r = s * (1.0 - da) + d * (1.0 - sa); }
        default: {}
    }
    return r;
}

fn run(x: u32, y: u32) {
    let index = y * pu(0u) + x;
    let base = index * N;
    let last = N - 1u;
    let sa = src[base + last] * clip_coverage(index);
    let da = dst[base + last];
    if (COMPOSITING == 0u) {
        for (var c = 0u; c < N; c++) {
            dst[base + c] = 0.0;
        }
        return;
    }
    if (COMPOSITING == 1u && BLEND_MODE == 0u) {
        for (var c = 0u; c < last; c++) {
            dst[base + c] = src[base + c];
        }
        dst[base + last] = sa;
        return;
    }
    let ra = porter_duff(sa, sa, da, da);
    if (ra > 0.0) {
        for (var c = 0u; c < last; c++) {
            let s = src[base + c];
            let d = dst[base + c];
            let b = (1.0 - da) * s + da * blend_channel(d, s);
            dst[base + c] = porter_duff(sa / ra * b, sa, da / ra * d, da);
        }
        dst[base + last] = ra;
    } else {
        for (var c = 0u; c < N; c++) {
            dst[base + c] = 0.0;
        }
    }
}
"#;

const GRADIENT: &str = r#"
@group(0) @binding(1) var<storage, read_write> dst: array<f32>;
@group(0) @binding(2) var<storage, read> stops: array<f32>;

const EPSILON: f32 = 1e-6;
const STOP_WORDS: u32 = 17u;

fn axial_t(p: vec2<f32>) -> vec2<f32> {
    let a = pt(6u) - p;
    let b = pt(8u) - pt(6u);
    return vec2<f32>(-dot(a, b) / dot(b, b), 1.0);
}

fn accept(t: f32, r0: f32, r1: f32) -> bool {
    return r0 + t * r1 >= 0.0
        && (t >= 0.0 || START_SPREAD != 0u)
        && (t <= 1.0 || END_SPREAD != 0u);
}

fn radial_t(p: vec2<f32>) -> vec2<f32> {
    let p0 = p - pt(6u);
    let p1 = pt(6u) - pt(8u);
    let r0 = pf(10u);
    let r1 = pf(11u) - pf(10u);
    let a = dot(p1, p1) - r1 * r1;
    let b = 2.0 * (dot(p0, p1) - r0 * r1);
    let c = dot(p0, p0) - r0 * r0;

    if (abs(a) < EPSILON) {
        if (abs(b) < EPSILON) {
            return vec2<f32>(0.0);
        }
        let t = -c / b;
        return vec2<f32>(t, select(0.0, 1.0, accept(t, r0, r1)));
    }

    let half_b = -0.5 * (b / a);
    let disc = half_b * half_b - c / a;
    if (disc < 0.0) {
        return vec2<f32>(0.0);
    }
    let d = sqrt(disc);
    let t0 = half_b - d;
    let t1 = half_b + d;
    let ok0 = accept(t0, r0, r1);
    let ok1 = accept(t1, r0, r1);
    if (ok0 && ok1) {
        return vec2<f32>(max(t0, t1), 1.0);
    }
    if (ok0) {
        return vec2<f32>(t0, 1.0);
    }
    if (ok1) {
        return vec2<f32>(t1, 1.0);
    }
    return vec2<f32>(0.0);
}

fn fold(t: f32) -> vec2<f32> {
    if (t >= 0.0 && t <= 1.0) {
        return vec2<f32>(t, 0.0);
    }
    let i = trunc(t);
    let s = t - i;
    let even = (i32(i) % 2) == 0;
    var r = vec2<f32>(s, 0.0);
    if (t > 1.0) {
        switch END_SPREAD {
            case 0u: { r = vec2<f32>(1.0, 1.0); }
            case 1u: { r = vec2<f32>(1.0, 0.0); }
            case 2u: { r = vec2<f32>(select(1.0 - s, s, even), 0.0); }
            default: {}
        }
    } else {
        r = vec2<f32>(1.0 + s, 0.0);
        switch START_SPREAD {
            case 0u: { r = vec2<f32>(0.0, 1.0); }
            case 1u: { r = vec2<f32>(0.0, 0.0); }
            case 2u: { r = vec2<f32>(select(1.0 + s, -s, even), 0.0); }
            default: {}
        }
    }
    return r;
}

fn stop_offset(i: u32) -> f32 {
    return stops[i * STOP_WORDS];
}

fn stop_color(i: u32, c: u32) -> f32 {
    return stops[i * STOP_WORDS + 1u + c];
}

fn shade(t: f32, base: u32) {
    let count = pu(12u);
    if (count == 0u) {
        for (var c = 0u; c < N; c++) {
            dst[base + c] = 0.0;
        }
        return;
    }
    let last = count - 1u;
    var lo = last;
    var hi = last;
    var u = 0.0;
    if (t <= stop_offset(0u)) {
        lo = 0u;
        hi = 0u;
    } else if (t < stop_offset(last)) {
        for (var i = 0u; i + 1u < count; i++) {
            let l = stop_offset(i);
            let r = stop_offset(i + 1u);
            if (l != r && l <= t && t <= r) {
                lo = i;
                hi = i + 1u;
                u = (t - l) / (r - l);
                break;
            }
        }
    }
    for (var c = 0u; c < N; c++) {
        let a = stop_color(lo, c);
        let b = stop_color(hi, c);
        dst[base + c] = a + u * (b - a);
    }
}

fn run(x: u32, y: u32) {
    let base = (y * pu(13u) + x) * N;
    let q = apply_affine(vec2<f32>(f32(x), f32(y)));
    var raw = vec2<f32>(0.0);
    if (RADIAL) {
        raw = radial_t(q);
    } else {
        raw = axial_t(q);
    }
    // NaN and infinities fail both comparisons.
    if (raw.y == 0.0 || !(abs(raw.x) <= 3.4e38)) {
        for (var c = 0u; c < N; c++) {
            dst[base + c] = 0.0;
        }
        return;
    }
    let folded = fold(raw.x);
    shade(folded.x, base);
    if (folded.y != 0.0) {
        dst[base + N - 1u] = 0.0;
    }
}
"#;

const RESAMPLE: &str = r#"
@group(0) @binding(1) var<storage, read> src: array<f32>;
@group(0) @binding(2) var<storage, read_write> dst: array<f32>;

fn wrap(x: i32, n: u32, mode: u32) -> vec2<i32> {
    let ni = i32(max(n, 1u));
    var r = vec2<i32>(clamp(x, 0, ni - 1), 1);
    switch mode {
        case 0u: {
            if (x < 0 || x >= ni) {
                r.y = 0;
            }
        }
        case 2u: { r.x = ((x % ni) + ni) % ni; }
        case 3u: {
            let ax = abs(x);
            let m = ax % ni;
            if (((ax / ni) & 1) == 1) {
                r.x = ni - m - 1;
            } else {
                r.x = m;
            }
        }
        default: {}
    }
    return r;
}

fn fetch(x: i32, y: i32) -> array<f32, 16> {
    var px: array<f32, 16>;
    let w = pu(6u);
    let wx = wrap(x, w, H_WRAP);
    let wy = wrap(y, pu(7u), V_WRAP);
    let base = (u32(wy.x) * w + u32(wx.x)) * N;
    for (var c = 0u; c < N; c++) {
        px[c] = src[base + c];
    }
    if (wx.y == 0 || wy.y == 0) {
        px[N - 1u] = 0.0;
    }
    return px;
}

fn interp2(t: f32, a: f32, b: f32) -> f32 {
    if (KERNEL == 2u) {
        let u = (1.0 - cos(t * PI)) * 0.5;
        return a + u * (b - a);
    }
    return a + t * (b - a);
}

fn cubic(t: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    let m0 = d - c - a + b;
    let m1 = a - b - m0;
    let m2 = c - a;
    return ((m0 * t + m1) * t + m2) * t + b;
}

fn hermite(t: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    let tension = pf(10u);
    let bias = pf(11u);
    let m0 = ((b - a) * (1.0 + bias) + (c - b) * (1.0 - bias)) * (1.0 - tension) * 0.5;
    let m1 = ((c - b) * (1.0 + bias) + (d - c) * (1.0 - bias)) * (1.0 - tension) * 0.5;
    let t2 = t * t;
    let t3 = t2 * t;
    return (2.0 * t3 - 3.0 * t2 + 1.0) * b
        + (t3 - 2.0 * t2 + t) * m0
        + (t3 - t2) * m1
        + (-2.0 * t3 + 3.0 * t2) * c;
}

fn interp4(t: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    if (KERNEL == 4u) {
        return hermite(t, a, b, c, d);
    }
    return cubic(t, a, b, c, d);
}

fn mitchell(x0: f32) -> f32 {
    let b = pf(10u);
    let c = pf(11u);
    let x = abs(x0);
    if (x < 1.0) {
        return ((12.0 - 9.0 * b - 6.0 * c) * x * x * x + (-18.0 + 12.0 * b + 6.0 * c) * x * x
            + (6.0 - 2.0 * b)) / 6.0;
    }
    if (x < 2.0) {
        return ((-b - 6.0 * c) * x * x * x + (6.0 * b + 30.0 * c) * x * x
            + (-12.0 * b - 48.0 * c) * x + (8.0 * b + 24.0 * c)) / 6.0;
    }
    return 0.0;
}

fn lanczos(x0: f32) -> f32 {
    let a = f32(pu(12u));
    let x = abs(x0);
    if (x == 0.0) {
        return 1.0;
    }
    if (x >= a) {
        return 0.0;
    }
    let px = PI * x;
    if (a == 1.0) {
        let s = sin(px) / px;
        return s * s;
    }
    return a * sin(px) * sin(px / a) / (px * px);
}

fn weight(d: f32) -> f32 {
    if (KERNEL == 5u) {
        return mitchell(d);
    }
    return lanczos(d);
}

fn sample2(x: f32, y: f32) -> array<f32, 16> {
    let fx = floor(x);
    let fy = floor(y);
    let tx = x - fx;
    let ty = y - fy;
    let ix = i32(fx);
    let iy = i32(fy);
    var p00 = fetch(ix, iy);
    var p10 = fetch(ix + 1, iy);
    var p01 = fetch(ix, iy + 1);
    var p11 = fetch(ix + 1, iy + 1);
    var out: array<f32, 16>;
    for (var c = 0u; c < N; c++) {
        out[c] = interp2(ty, interp2(tx, p00[c], p10[c]), interp2(tx, p01[c], p11[c]));
    }
    return out;
}

fn sample4(x: f32, y: f32) -> array<f32, 16> {
    let fx = floor(x);
    let fy = floor(y);
    let tx = x - fx;
    let ty = y - fy;
    let ix = i32(fx);
    let iy = i32(fy);
    var rows: array<array<f32, 16>, 4>;
    for (var r = 0; r < 4; r++) {
        let yy = iy + r - 1;
        var q0 = fetch(ix - 1, yy);
        var q1 = fetch(ix, yy);
        var q2 = fetch(ix + 1, yy);
        var q3 = fetch(ix + 2, yy);
        for (var c = 0u; c < N; c++) {
            rows[r][c] = interp4(tx, q0[c], q1[c], q2[c], q3[c]);
        }
    }
    var out: array<f32, 16>;
    for (var c = 0u; c < N; c++) {
        out[c] = interp4(ty, rows[0][c], rows[1][c], rows[2][c], rows[3][c]);
    }
    return out;
}

fn convolve(x: f32, y: f32, size: i32) -> array<f32, 16> {
    let fx = i32(floor(x));
    let fy = i32(floor(y));
    let shift = (size >> 1u) - (1 - (size & 1));
    var acc: array<f32, 16>;
    var total = 0.0;
    for (var yy = fy - shift; yy < fy - shift + size; yy++) {
        for (var xx = fx - shift; xx < fx - shift + size; xx++) {
            let dx = x - f32(xx);
            let dy = y - f32(yy);
            let w = weight(sqrt(dx * dx + dy * dy));
            if (w != 0.0) {
                var px = fetch(xx, yy);
                for (var c = 0u; c < N; c++) {
                    acc[c] += w * px[c];
                }
                total += w;
            }
        }
    }
    var out: array<f32, 16>;
    if (total != 0.0) {
        for (var c = 0u; c < N; c++) {
            out[c] = acc[c] / total;
        }
    }
    return out;
}

fn sample(x: f32, y: f32) -> array<f32, 16> {
    let lobes = i32(pu(12u));
    if (KERNEL == 1u || KERNEL == 2u) {
        return sample2(x, y);
    }
    if (KERNEL == 3u || KERNEL == 4u) {
        return sample4(x, y);
    }
    if (KERNEL == 5u) {
        return convolve(x, y, 5);
    }
    if (KERNEL == 6u && lobes > 0) {
        return convolve(x, y, 2 * lobes);
    }
    return fetch(i32(floor(x)), i32(floor(y)));
}

fn run(x: u32, y: u32) {
    let aa = max(pu(9u), 1u);
    let inv = 1.0 / f32(aa);
    var acc: array<f32, 16>;
    for (var j = 0u; j < aa; j++) {
        for (var i = 0u; i < aa; i++) {
            let sp = vec2<f32>(f32(x * aa + i) * inv, f32(y * aa + j) * inv);
            let q = apply_affine(sp);
            var v = sample(q.x, q.y);
            for (var c = 0u; c < N; c++) {
                acc[c] += v[c];
            }
        }
    }
    let samples = f32(aa * aa);
    let base = (y * pu(8u) + x) * N;
    for (var c = 0u; c < N; c++) {
        dst[base + c] = acc[c] / samples;
    }
}
"#;

const SET_OPACITY: &str = r#"
@group(0) @binding(1) var<storage, read_write> dst: array<f32>;

fn run(x: u32, y: u32) {
    let a = (y * pu(0u) + x) * N + N - 1u;
    dst[a] = dst[a] * pf(2u);
}
"#;

const CLIP: &str = r#"
@group(0) @binding(1) var<storage, read_write> dst: array<f32>;
@group(0) @binding(2) var<storage, read> clip: array<f32>;

fn run(x: u32, y: u32) {
    let index = y * pu(0u) + x;
    let a = index * N + N - 1u;
    dst[a] = dst[a] * clip[index * 2u] * clip[index * 2u + 1u];
}
"#;

const SHADOW: &str = r#"
@group(0) @binding(1) var<storage, read> src: array<f32>;
@group(0) @binding(2) var<storage, read_write> dst: array<f32>;

fn gauss(i: i32, sigma: f32, radius: i32) -> f32 {
    if (radius == 0) {
        return 1.0;
    }
    let x = f32(i);
    return exp(-(x * x) / (2.0 * sigma * sigma));
}

fn round_away(v: f32) -> i32 {
    return i32(sign(v) * floor(abs(v) + 0.5));
}

fn run(x: u32, y: u32) {
    let sigma = pf(18u);
    var radius = i32(pu(19u));
    if (sigma <= 0.0) {
        radius = 0;
    }
    let w = i32(pu(20u));
    let h = i32(pu(21u));
    var norm = 0.0;
    for (var i = -radius; i <= radius; i++) {
        norm += gauss(i, sigma, radius);
    }
    let ox = round_away(pf(16u));
    let oy = round_away(pf(17u));
    var value = 0.0;
    for (var j = -radius; j <= radius; j++) {
        let sy = i32(y) - oy + j;
        if (sy < 0 || sy >= h) {
            continue;
        }
        let wy = gauss(j, sigma, radius) / norm;
        for (var i = -radius; i <= radius; i++) {
            let sx = i32(x) - ox + i;
            if (sx < 0 || sx >= w) {
                continue;
            }
            let wx = gauss(i, sigma, radius) / norm;
            value += wx * wy * src[u32(sy * w + sx) * N + N - 1u];
        }
    }
    let base = (y * u32(w) + x) * N;
    for (var c = 0u; c < N - 1u; c++) {
        dst[base + c] = pf(c);
    }
    dst[base + N - 1u] = pf(N - 1u) * value;
}
"#;

const CLIP_COVERAGE: &str = r#"
fn clip_coverage(index: u32) -> f32 {
    return clip[index * 2u] * clip[index * 2u + 1u];
}
"#;

const NO_CLIP: &str = r#"
fn clip_coverage(index: u32) -> f32 {
    return 1.0;
}
"#;

fn clip_source(out: &mut String, clipped: bool) {
    if clipped {
        out.push_str("@group(0) @binding(3) var<storage, read> clip: array<f32>;\n");
        out.push_str(CLIP_COVERAGE);
    } else {
        out.push_str(NO_CLIP);
    }
}

/// Complete WGSL module for `key` on pixels of `components` channels.
pub(crate) fn source(key: PipelineKey, components: u32, workgroup: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "const N: u32 = {components}u;");
    let _ = writeln!(out, "const WG: u32 = {workgroup}u;");
    match key {
        PipelineKey::Stencil(kind) => {
            let _ = writeln!(out, "const KIND: u32 = {}u;", kind.code());
            out.push_str(PRELUDE);
            out.push_str(STENCIL);
        }
        PipelineKey::Fill { winding, clipped } => {
            let _ = writeln!(out, "const WINDING: u32 = {}u;", winding.code());
            out.push_str(PRELUDE);
            out.push_str(FILL);
            clip_source(&mut out, clipped);
        }
        PipelineKey::Blend {
            compositing,
            blend,
            clipped,
        } => {
            let _ = writeln!(out, "const COMPOSITING: u32 = {}u;", compositing.code());
            let _ = writeln!(out, "const BLEND_MODE: u32 = {}u;", blend.code());
            out.push_str(PRELUDE);
            out.push_str(BLEND);
            clip_source(&mut out, clipped);
        }
        PipelineKey::Gradient {
            kind,
            start_spread,
            end_spread,
        } => {
            let _ = writeln!(out, "const RADIAL: bool = {};", kind == GradientKind::Radial);
            let _ = writeln!(out, "const START_SPREAD: u32 = {}u;", start_spread.code());
            let _ = writeln!(out, "const END_SPREAD: u32 = {}u;", end_spread.code());
            out.push_str(PRELUDE);
            out.push_str(GRADIENT);
        }
        PipelineKey::Resample {
            kernel,
            h_wrap,
            v_wrap,
        } => {
            let _ = writeln!(out, "const KERNEL: u32 = {}u;", kernel.code());
            let _ = writeln!(out, "const H_WRAP: u32 = {}u;", h_wrap.code());
            let _ = writeln!(out, "const V_WRAP: u32 = {}u;", v_wrap.code());
            out.push_str(PRELUDE);
            out.push_str(RESAMPLE);
        }
        PipelineKey::SetOpacity => {
            out.push_str(PRELUDE);
            out.push_str(SET_OPACITY);
        }
        PipelineKey::Clip => {
            out.push_str(PRELUDE);
            out.push_str(CLIP);
        }
        PipelineKey::Shadow => {
            out.push_str(PRELUDE);
            out.push_str(SHADOW);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../../tests/unit/device/wgpu_shader.rs"]
mod tests;
