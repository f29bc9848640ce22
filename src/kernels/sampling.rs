use std::f32::consts::PI;

use crate::foundation::core::MAX_COMPONENTS;
use crate::pipeline::key::{ResamplingKernel, WrapMode};

pub(crate) type Pixel = [f32; MAX_COMPONENTS];

/// Resolve index `x` on an axis of length `n`. The flag is false when a `None` wrap fell
/// outside the axis; the index is then clamped.
pub(crate) fn wrap_index(x: i64, n: u32, mode: WrapMode) -> (bool, u32) {
    let n = i64::from(n.max(1));
    let clamped = x.clamp(0, n - 1) as u32;
    match mode {
        WrapMode::None => ((0..n).contains(&x), clamped),
        WrapMode::Clamp => (true, clamped),
        WrapMode::Repeat => (true, x.rem_euclid(n) as u32),
        WrapMode::Mirror => {
            let ax = x.unsigned_abs() as i64;
            let r = ax % n;
            if (ax / n) & 1 == 1 {
                (true, (n - r - 1) as u32)
            } else {
                (true, r as u32)
            }
        }
    }
}

/// Source texture addressed through per-axis wrap modes.
pub(crate) struct Sampler<'a, F: Fn(usize, &mut Pixel) + ?Sized> {
    pub(crate) read: &'a F,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) components: usize,
    pub(crate) h_wrap: WrapMode,
    pub(crate) v_wrap: WrapMode,
}

/// Scalar parameters of the parameterized kernels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct KernelParams {
    /// Hermite tension or Mitchell B.
    pub(crate) a: f32,
    /// Hermite bias or Mitchell C.
    pub(crate) b: f32,
    pub(crate) lobes: u32,
}

impl<F: Fn(usize, &mut Pixel) + ?Sized> Sampler<'_, F> {
    pub(crate) fn fetch(&self, x: i64, y: i64) -> Pixel {
        let mut px = [0.0; MAX_COMPONENTS];
        let (in_x, ix) = wrap_index(x, self.width, self.h_wrap);
        let (in_y, iy) = wrap_index(y, self.height, self.v_wrap);
        (self.read)(iy as usize * self.width as usize + ix as usize, &mut px);
        if !(in_x && in_y) {
            px[self.components - 1] = 0.0;
        }
        px
    }

    /// Evaluate `kernel` at source-space point `(x, y)`.
    pub(crate) fn sample(&self, kernel: ResamplingKernel, k: KernelParams, x: f32, y: f32) -> Pixel {
        match kernel {
            ResamplingKernel::None => self.fetch(x.floor() as i64, y.floor() as i64),
            ResamplingKernel::Linear => self.sample2(x, y, |t, a, b| a + t * (b - a)),
            ResamplingKernel::Cosine => self.sample2(x, y, |t, a, b| {
                let u = (1.0 - (t * PI).cos()) * 0.5;
                a + u * (b - a)
            }),
            ResamplingKernel::Cubic => self.sample4(x, y, cubic),
            ResamplingKernel::Hermite => {
                self.sample4(x, y, |t, a, b, c, d| hermite(t, a, b, c, d, k.a, k.b))
            }
            ResamplingKernel::Mitchell => {
                let (b, c) = (k.a, k.b);
                self.convolve(x, y, 5, |d| mitchell(d, b, c))
            }
            ResamplingKernel::Lanczos => match k.lobes {
                0 => self.fetch(x.floor() as i64, y.floor() as i64),
                a => self.convolve(x, y, 2 * a as i64, |d| lanczos(d, a as f32)),
            },
        }
    }

    fn sample2(&self, x: f32, y: f32, f: impl Fn(f32, f32, f32) -> f32) -> Pixel {
        let (fx, fy) = (x.floor(), y.floor());
        let (tx, ty) = (x - fx, y - fy);
        let (ix, iy) = (fx as i64, fy as i64);
        let p00 = self.fetch(ix, iy);
        let p10 = self.fetch(ix + 1, iy);
        let p01 = self.fetch(ix, iy + 1);
        let p11 = self.fetch(ix + 1, iy + 1);
        let mut out = [0.0; MAX_COMPONENTS];
        for i in 0..self.components {
            let top = f(tx, p00[i], p10[i]);
            let bottom = f(tx, p01[i], p11[i]);
            out[i] = f(ty, top, bottom);
        }
        out
    }

    fn sample4(&self, x: f32, y: f32, f: impl Fn(f32, f32, f32, f32, f32) -> f32) -> Pixel {
        let (fx, fy) = (x.floor(), y.floor());
        let (tx, ty) = (x - fx, y - fy);
        let (ix, iy) = (fx as i64, fy as i64);
        let mut rows = [[0.0f32; MAX_COMPONENTS]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            let yy = iy + r as i64 - 1;
            let q = [-1, 0, 1, 2].map(|dx| self.fetch(ix + dx, yy));
            for i in 0..self.components {
                row[i] = f(tx, q[0][i], q[1][i], q[2][i], q[3][i]);
            }
        }
        let mut out = [0.0; MAX_COMPONENTS];
        for i in 0..self.components {
            out[i] = f(ty, rows[0][i], rows[1][i], rows[2][i], rows[3][i]);
        }
        out
    }

    fn convolve(&self, x: f32, y: f32, size: i64, weight: impl Fn(f32) -> f32) -> Pixel {
        let (fx, fy) = (x.floor() as i64, y.floor() as i64);
        let shift = (size >> 1) - (1 - (size & 1));
        let (min_x, min_y) = (fx - shift, fy - shift);
        let mut acc = [0.0f32; MAX_COMPONENTS];
        let mut total = 0.0f32;
        for yy in min_y..min_y + size {
            for xx in min_x..min_x + size {
                let dx = x - xx as f32;
                let dy = y - yy as f32;
                let w = weight((dx * dx + dy * dy).sqrt());
                if w == 0.0 {
                    continue;
                }
                let px = self.fetch(xx, yy);
                for i in 0..self.components {
                    acc[i] += w * px[i];
                }
                total += w;
            }
        }
        if total == 0.0 {
            return [0.0; MAX_COMPONENTS];
        }
        for v in acc.iter_mut().take(self.components) {
            *v /= total;
        }
        acc
    }
}

pub(crate) fn cubic(t: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    let m0 = d - c - a + b;
    let m1 = a - b - m0;
    let m2 = c - a;
    let m3 = b;
    ((m0 * t + m1) * t + m2) * t + m3
}

pub(crate) fn hermite(t: f32, a: f32, b: f32, c: f32, d: f32, tension: f32, bias: f32) -> f32 {
    let m0 = ((b - a) * (1.0 + bias) + (c - b) * (1.0 - bias)) * (1.0 - tension) * 0.5;
    let m1 = ((c - b) * (1.0 + bias) + (d - c) * (1.0 - bias)) * (1.0 - tension) * 0.5;
    let t2 = t * t;
    let t3 = t2 * t;
    let a0 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let a1 = t3 - 2.0 * t2 + t;
    let a2 = t3 - t2;
    let a3 = -2.0 * t3 + 3.0 * t2;
    a0 * b + a1 * m0 + a2 * m1 + a3 * c
}

pub(crate) fn mitchell(x: f32, b: f32, c: f32) -> f32 {
    let x = x.abs();
    if x < 1.0 {
        let a1 = 12.0 - 9.0 * b - 6.0 * c;
        let b1 = -18.0 + 12.0 * b + 6.0 * c;
        let c1 = 6.0 - 2.0 * b;
        (a1 * x * x * x + b1 * x * x + c1) / 6.0
    } else if x < 2.0 {
        let a2 = -b - 6.0 * c;
        let b2 = 6.0 * b + 30.0 * c;
        let c2 = -12.0 * b - 48.0 * c;
        let d2 = 8.0 * b + 24.0 * c;
        (a2 * x * x * x + b2 * x * x + c2 * x + d2) / 6.0
    } else {
        0.0
    }
}

pub(crate) fn lanczos(x: f32, a: f32) -> f32 {
    let x = x.abs();
    if x == 0.0 {
        return 1.0;
    }
    if x >= a {
        return 0.0;
    }
    let px = PI * x;
    if a == 1.0 {
        let s = px.sin() / px;
        return s * s;
    }
    a * px.sin() * (px / a).sin() / (px * px)
}

#[cfg(test)]
#[path = "../../tests/unit/kernels/sampling.rs"]
mod tests;
