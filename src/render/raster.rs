use crate::device::Backend;
use crate::foundation::core::{Affine, ColorValue, Point, Rect};
use crate::foundation::error::{RasterError, RasterResult};
use crate::foundation::math::{almost_zero, clamp_range, cross, int_range, scan, sort_by_y};
use crate::kernels::params::{FillParams, StencilParams};
use crate::pipeline::key::{PipelineKey, PrimitiveKind, WindingRule};
use crate::render::encoder::Encoder;

/// One piece of a flattened shape, in device coordinates.
///
/// Quadratic and cubic primitives cover the part of their control triangle selected by the
/// implicit curve test; `v0..v2` are the cubic's implicit coefficient vectors.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum CurvePrimitive {
    /// Solid triangle.
    Triangle {
        p0: Point,
        p1: Point,
        p2: Point,
    },
    /// Quadratic segment: start, control, end.
    Quadratic {
        p0: Point,
        p1: Point,
        p2: Point,
    },
    /// Cubic segment reduced to a triangle with implicit coefficients.
    Cubic {
        p0: Point,
        p1: Point,
        p2: Point,
        v0: [f64; 3],
        v1: [f64; 3],
        v2: [f64; 3],
    },
}

impl CurvePrimitive {
    /// Two triangles covering `rect`.
    pub fn rect(rect: Rect) -> [CurvePrimitive; 2] {
        let (a, b) = (Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y0));
        let (c, d) = (Point::new(rect.x1, rect.y1), Point::new(rect.x0, rect.y1));
        [
            CurvePrimitive::Triangle {
                p0: a,
                p1: b,
                p2: c,
            },
            CurvePrimitive::Triangle {
                p0: a,
                p1: c,
                p2: d,
            },
        ]
    }

    /// Stencil program family of this primitive.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Triangle { .. } => PrimitiveKind::Triangle,
            Self::Quadratic { .. } => PrimitiveKind::Quadratic,
            Self::Cubic { .. } => PrimitiveKind::Cubic,
        }
    }

    /// Control triangle.
    pub fn points(&self) -> [Point; 3] {
        match *self {
            Self::Triangle { p0, p1, p2 }
            | Self::Quadratic { p0, p1, p2 }
            | Self::Cubic { p0, p1, p2, .. } => [p0, p1, p2],
        }
    }

    /// Same primitive with its points mapped through `t`. Cubic coefficients are kept.
    pub fn transformed(&self, t: Affine) -> Self {
        match *self {
            Self::Triangle { p0, p1, p2 } => Self::Triangle {
                p0: t * p0,
                p1: t * p1,
                p2: t * p2,
            },
            Self::Quadratic { p0, p1, p2 } => Self::Quadratic {
                p0: t * p0,
                p1: t * p1,
                p2: t * p2,
            },
            Self::Cubic {
                p0,
                p1,
                p2,
                v0,
                v1,
                v2,
            } => Self::Cubic {
                p0: t * p0,
                p1: t * p1,
                p2: t * p2,
                v0,
                v1,
                v2,
            },
        }
    }

    fn coefficients(&self) -> [[f32; 3]; 3] {
        match self {
            Self::Cubic { v0, v1, v2, .. } => [v0, v1, v2].map(|v| v.map(|c| c as f32)),
            _ => [[0.0; 3]; 3],
        }
    }
}

/// Dispatch of one primitive over its screen bound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StencilJob {
    pub(crate) kind: PrimitiveKind,
    pub(crate) params: StencilParams,
    pub(crate) grid: [u32; 2],
    /// Sample-space box `[x_lo, x_hi] x [y_lo, y_hi)` the job may touch.
    pub(crate) x_lo: f64,
    pub(crate) x_hi: f64,
    pub(crate) y_lo: i64,
    pub(crate) y_hi: i64,
}

/// Screen bound and parameters for `prim` on a `width x height` sample grid.
///
/// Returns `None` for degenerate primitives and for bounds that miss the grid.
pub(crate) fn stencil_job(prim: &CurvePrimitive, width: u32, height: u32) -> Option<StencilJob> {
    let [p0, p1, p2] = prim.points();
    let orientation = cross(p0, p1, p2);
    if !orientation.is_finite() || almost_zero(orientation) {
        return None;
    }
    let q = sort_by_y([p0, p1, p2]);

    let rows = clamp_range(int_range(q[0].y, q[2].y), height);
    let span = (scan(q[0], q[2], q[1].y) - q[1].x).abs();
    let columns = clamp_range(int_range(0.0, span), width);
    if rows.is_empty() || columns.is_empty() {
        return None;
    }

    let x_lo = q.iter().map(|p| p.x).fold(f64::INFINITY, f64::min).max(0.0);
    let x_hi = q
        .iter()
        .map(|p| p.x)
        .fold(f64::NEG_INFINITY, f64::max)
        .min(f64::from(width) - 1.0);
    if x_lo > x_hi {
        return None;
    }

    let pt = |p: Point| [p.x as f32, p.y as f32];
    let [v0, v1, v2] = prim.coefficients();
    let params = StencilParams {
        p0: pt(p0),
        p1: pt(p1),
        p2: pt(p2),
        v0,
        v1,
        v2,
        winding: if orientation > 0.0 { 1 } else { -1 },
        width,
        height,
        y_start: rows.start as u32,
        q0: pt(q[0]),
        q1: pt(q[1]),
        q2: pt(q[2]),
    };
    Some(StencilJob {
        kind: prim.kind(),
        params,
        grid: [(columns.end - columns.start) as u32, (rows.end - rows.start) as u32],
        x_lo,
        x_hi,
        y_lo: rows.start,
        y_hi: rows.end,
    })
}

/// Pixel region `(offset, size)` covering every sample the jobs may touch.
pub(crate) fn fill_region(
    jobs: &[StencilJob],
    antialias: u32,
    width: u32,
    height: u32,
) -> Option<([u32; 2], [u32; 2])> {
    let aa = i64::from(antialias);
    let mut x0 = i64::MAX;
    let mut x1 = i64::MIN;
    let mut y0 = i64::MAX;
    let mut y1 = i64::MIN;
    for job in jobs {
        x0 = x0.min(job.x_lo.ceil() as i64 / aa);
        x1 = x1.max(job.x_hi.floor() as i64 / aa + 1);
        y0 = y0.min(job.y_lo / aa);
        y1 = y1.max((job.y_hi - 1) / aa + 1);
    }
    let xs = clamp_range(x0..x1, width);
    let ys = clamp_range(y0..y1, height);
    if xs.is_empty() || ys.is_empty() {
        return None;
    }
    Some((
        [xs.start as u32, ys.start as u32],
        [(xs.end - xs.start) as u32, (ys.end - ys.start) as u32],
    ))
}

impl<B: Backend> Encoder<B> {
    /// Fill the shape made of `primitives` with `color`.
    ///
    /// Primitives are rasterized into the session's signed stencil at `antialias` samples per
    /// pixel axis, then resolved under `winding`. Covered pixels receive the color with alpha
    /// scaled by coverage (and by the clip layer's coverage when `clip` is given). Pixels with
    /// no coverage are left untouched.
    #[tracing::instrument(level = "debug", skip(self, destination, primitives, clip), fields(count = primitives.len()))]
    pub fn draw_shape(
        &mut self,
        destination: &B::Buffer,
        primitives: &[CurvePrimitive],
        color: ColorValue,
        winding: WindingRule,
        antialias: u32,
        clip: Option<&B::Buffer>,
    ) -> RasterResult<()> {
        self.batcher.ensure_open()?;
        if antialias == 0 {
            return Err(RasterError::validation("antialias factor must be >= 1"));
        }
        if color.count() != self.components() as usize {
            return Err(RasterError::validation(format!(
                "color has {} channels, renderer expects {}",
                color.count(),
                self.components()
            )));
        }
        self.check_layer("destination", destination, self.components())?;
        self.check_clip(clip)?;

        let (Some(sw), Some(sh)) = (
            self.width.checked_mul(antialias),
            self.height.checked_mul(antialias),
        ) else {
            return Err(RasterError::validation(format!(
                "antialias factor {antialias} overflows the sample grid"
            )));
        };
        let scale = Affine::scale(f64::from(antialias));
        let jobs: Vec<StencilJob> = primitives
            .iter()
            .filter_map(|p| stencil_job(&p.transformed(scale), sw, sh))
            .collect();
        let Some((offset, size)) = fill_region(&jobs, antialias, self.width, self.height) else {
            return Ok(());
        };

        let mut programs = Vec::with_capacity(jobs.len());
        for job in &jobs {
            programs.push(self.renderer.program(PipelineKey::Stencil(job.kind))?);
        }
        let fill = self.renderer.program(PipelineKey::Fill {
            winding,
            clipped: clip.is_some(),
        })?;
        let stencil_bytes = (sw as usize)
            .checked_mul(sh as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| RasterError::allocation("stencil size overflows usize"))?;

        let stencil = self
            .stencil
            .acquire(&self.resources, &mut self.batcher, stencil_bytes)?;
        for (job, program) in jobs.iter().zip(&programs) {
            self.dispatch_program(program, &job.params, &[&stencil], job.grid)?;
        }

        let params = FillParams {
            color: color.padded(),
            offset,
            width: self.width,
            antialias,
        };
        let mut bindings = vec![destination, &stencil];
        bindings.extend(clip);
        self.dispatch_program(&fill, &params, &bindings, size)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
