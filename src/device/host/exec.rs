use rayon::prelude::*;

use crate::device::host::{HostBuffer, HostCommand, HostProgram};
use crate::foundation::core::MAX_COMPONENTS;
use crate::kernels::blend::blend_pixel;
use crate::kernels::coverage::{curve_inside, resolve, sample_position};
use crate::kernels::gradient::{KernelStop, apply_affine, axial_t, gradient_pixel, radial_t};
use crate::kernels::params::{
    FillParams, GradientParams, LayerParams, ResampleParams, STOP_WORDS, ShadowParams,
    StencilParams, read_params,
};
use crate::kernels::sampling::{KernelParams, Pixel, Sampler};
use crate::pipeline::key::{GradientKind, PipelineKey};

pub(crate) fn run(cmd: &HostCommand) {
    match cmd {
        HostCommand::Dispatch {
            program,
            params,
            bindings,
            grid,
        } => dispatch(program, params, bindings, *grid),
        HostCommand::FillZero(buffer) => buffer.zero(),
        HostCommand::Copy { src, dst } => dst.copy_from(src),
    }
}

fn for_each_cell(grid: [u32; 2], f: impl Fn(u32, u32) + Sync) {
    let [gw, gh] = grid;
    (0..gh).into_par_iter().for_each(|gy| {
        for gx in 0..gw {
            f(gx, gy);
        }
    });
}

fn dispatch(program: &HostProgram, params: &[u8], b: &[HostBuffer], grid: [u32; 2]) {
    if grid[0] == 0 || grid[1] == 0 {
        return;
    }
    let n = program.components;
    match program.key {
        PipelineKey::Stencil(kind) => {
            let Some(p) = read_params::<StencilParams>(params) else {
                return;
            };
            let stencil = &b[0];
            for_each_cell(grid, |gx, gy| {
                if let Some((x, y)) = sample_position(&p, gx, gy)
                    && curve_inside(kind, &p, x as f32, y as f32)
                {
                    stencil.add_i32(y as usize * p.width as usize + x as usize, p.winding);
                }
            });
        }
        PipelineKey::Fill { winding, clipped } => {
            let Some(p) = read_params::<FillParams>(params) else {
                return;
            };
            let (dst, stencil) = (&b[0], &b[1]);
            let clip = clipped.then(|| &b[2]);
            let aa = p.antialias as usize;
            let row = p.width as usize * aa;
            let samples = (aa * aa) as f32;
            for_each_cell(grid, |gx, gy| {
                let x = (p.offset[0] + gx) as usize;
                let y = (p.offset[1] + gy) as usize;
                if x >= p.width as usize {
                    return;
                }
                let mut sum = 0.0;
                for j in 0..aa {
                    for i in 0..aa {
                        sum += resolve(winding, stencil.load_i32((y * aa + j) * row + x * aa + i));
                    }
                }
                let index = y * p.width as usize + x;
                let mut coverage = sum / samples;
                if let Some(clip) = clip {
                    coverage *= clip_coverage(clip, index);
                }
                if coverage > 0.0 {
                    let mut px = [0.0; MAX_COMPONENTS];
                    px[..n].copy_from_slice(&p.color[..n]);
                    px[n - 1] *= coverage;
                    dst.write_pixel(index, &px[..n]);
                }
            });
        }
        PipelineKey::Blend {
            compositing,
            blend,
            clipped,
        } => {
            let Some(p) = read_params::<LayerParams>(params) else {
                return;
            };
            let (src, dst) = (&b[0], &b[1]);
            let clip = clipped.then(|| &b[2]);
            for_each_cell(grid, |x, y| {
                let index = (y * p.width + x) as usize;
                let mut s = [0.0; MAX_COMPONENTS];
                let mut d = [0.0; MAX_COMPONENTS];
                src.read_pixel(index, n, &mut s);
                dst.read_pixel(index, n, &mut d);
                if let Some(clip) = clip {
                    s[n - 1] *= clip_coverage(clip, index);
                }
                blend_pixel(compositing, blend, &s[..n], &mut d[..n]);
                dst.write_pixel(index, &d[..n]);
            });
        }
        PipelineKey::Gradient {
            kind,
            start_spread,
            end_spread,
        } => {
            let Some(p) = read_params::<GradientParams>(params) else {
                return;
            };
            let (dst, stops) = (&b[0], read_stops(&b[1], p.stop_count as usize));
            for_each_cell(grid, |x, y| {
                let q = apply_affine(&p.inverse, [x as f32, y as f32]);
                let t = match kind {
                    GradientKind::Linear => Some(axial_t(q, p.start, p.end)),
                    GradientKind::Radial => radial_t(
                        q,
                        p.start,
                        p.start_radius,
                        p.end,
                        p.end_radius,
                        start_spread,
                        end_spread,
                    ),
                };
                let mut px = [0.0; MAX_COMPONENTS];
                gradient_pixel(&stops, t, start_spread, end_spread, &mut px[..n]);
                dst.write_pixel((y * p.width + x) as usize, &px[..n]);
            });
        }
        PipelineKey::Resample {
            kernel,
            h_wrap,
            v_wrap,
        } => {
            let Some(p) = read_params::<ResampleParams>(params) else {
                return;
            };
            let (src, dst) = (&b[0], &b[1]);
            let read = |i: usize, out: &mut Pixel| src.read_pixel(i, n, out);
            let sampler = Sampler {
                read: &read,
                width: p.src_width,
                height: p.src_height,
                components: n,
                h_wrap,
                v_wrap,
            };
            let k = KernelParams {
                a: p.a,
                b: p.b,
                lobes: p.lobes,
            };
            let aa = p.antialias.max(1);
            let inv_aa = 1.0 / aa as f32;
            let samples = (aa * aa) as f32;
            for_each_cell(grid, |x, y| {
                let mut acc = [0.0f32; MAX_COMPONENTS];
                for j in 0..aa {
                    for i in 0..aa {
                        let sp = [
                            (x * aa + i) as f32 * inv_aa,
                            (y * aa + j) as f32 * inv_aa,
                        ];
                        let q = apply_affine(&p.inverse, sp);
                        let v = sampler.sample(kernel, k, q[0], q[1]);
                        for c in 0..n {
                            acc[c] += v[c];
                        }
                    }
                }
                for v in acc.iter_mut().take(n) {
                    *v /= samples;
                }
                dst.write_pixel((y * p.width + x) as usize, &acc[..n]);
            });
        }
        PipelineKey::SetOpacity => {
            let Some(p) = read_params::<LayerParams>(params) else {
                return;
            };
            let dst = &b[0];
            for_each_cell(grid, |x, y| {
                let a = ((y * p.width + x) as usize) * n + n - 1;
                dst.store_f32(a, dst.load_f32(a) * p.opacity);
            });
        }
        PipelineKey::Clip => {
            let Some(p) = read_params::<LayerParams>(params) else {
                return;
            };
            let (dst, clip) = (&b[0], &b[1]);
            for_each_cell(grid, |x, y| {
                let index = (y * p.width + x) as usize;
                let a = index * n + n - 1;
                dst.store_f32(a, dst.load_f32(a) * clip_coverage(clip, index));
            });
        }
        PipelineKey::Shadow => {
            let Some(p) = read_params::<ShadowParams>(params) else {
                return;
            };
            let (src, dst) = (&b[0], &b[1]);
            let weights = gaussian_weights(p.sigma, p.radius);
            let r = p.radius as i64;
            let (ox, oy) = (p.offset[0].round() as i64, p.offset[1].round() as i64);
            let (w, h) = (i64::from(p.width), i64::from(p.height));
            for_each_cell(grid, |x, y| {
                let mut value = 0.0;
                for (j, wy) in weights.iter().enumerate() {
                    let sy = i64::from(y) - oy + j as i64 - r;
                    if !(0..h).contains(&sy) {
                        continue;
                    }
                    for (i, wx) in weights.iter().enumerate() {
                        let sx = i64::from(x) - ox + i as i64 - r;
                        if !(0..w).contains(&sx) {
                            continue;
                        }
                        let a = src.load_f32((sy * w + sx) as usize * n + n - 1);
                        value += wx * wy * a;
                    }
                }
                let mut px = [0.0; MAX_COMPONENTS];
                px[..n].copy_from_slice(&p.color[..n]);
                px[n - 1] *= value;
                dst.write_pixel((y * p.width + x) as usize, &px[..n]);
            });
        }
    }
}

/// Coverage of a gray + alpha clip layer pixel.
fn clip_coverage(clip: &HostBuffer, index: usize) -> f32 {
    clip.load_f32(index * 2) * clip.load_f32(index * 2 + 1)
}

fn read_stops(buffer: &HostBuffer, count: usize) -> Vec<KernelStop> {
    (0..count)
        .map(|s| {
            let base = s * STOP_WORDS;
            let mut color = [0.0; MAX_COMPONENTS];
            for (c, v) in color.iter_mut().enumerate() {
                *v = buffer.load_f32(base + 1 + c);
            }
            KernelStop {
                offset: buffer.load_f32(base),
                color,
            }
        })
        .collect()
}

/// Normalized 1-D Gaussian taps over `[-radius, radius]`.
pub(crate) fn gaussian_weights(sigma: f32, radius: u32) -> Vec<f32> {
    if sigma <= 0.0 || radius == 0 {
        return vec![1.0];
    }
    let r = radius as i32;
    let mut w: Vec<f32> = (-r..=r)
        .map(|i| {
            let x = i as f32;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = w.iter().sum();
    for v in &mut w {
        *v /= sum;
    }
    w
}
