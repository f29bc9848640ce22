use crate::device::Backend;
use crate::foundation::core::{Affine, GradientStop, Point};
use crate::foundation::error::{RasterError, RasterResult};
use crate::foundation::math::{almost_equal, almost_zero};
use crate::kernels::params::{GradientParams, STOP_WORDS, affine_words};
use crate::pipeline::key::{GradientKind, PipelineKey, SpreadMode};
use crate::render::encoder::Encoder;

/// Color ramp shared by linear and radial gradients.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientPaint {
    /// Color stops in any order; they are sorted by offset before use.
    pub stops: Vec<GradientStop>,
    /// Maps gradient space to device space.
    pub transform: Affine,
    /// Behavior for `t < 0`.
    pub start_spread: SpreadMode,
    /// Behavior for `t > 1`.
    pub end_spread: SpreadMode,
}

impl GradientPaint {
    /// Untransformed ramp padded at both ends.
    pub fn new(stops: Vec<GradientStop>) -> Self {
        Self {
            stops,
            transform: Affine::IDENTITY,
            start_spread: SpreadMode::Pad,
            end_spread: SpreadMode::Pad,
        }
    }

    /// Replace the gradient-to-device transform.
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    /// Replace both spread modes.
    pub fn with_spread(mut self, start: SpreadMode, end: SpreadMode) -> Self {
        self.start_spread = start;
        self.end_spread = end;
        self
    }
}

struct Geometry {
    kind: GradientKind,
    start: Point,
    start_radius: f64,
    end: Point,
    end_radius: f64,
}

impl<B: Backend> Encoder<B> {
    /// Paint every pixel of `destination` with a gradient along `start -> end`.
    #[tracing::instrument(level = "debug", skip(self, destination, paint))]
    pub fn linear_gradient(
        &mut self,
        destination: &B::Buffer,
        paint: &GradientPaint,
        start: Point,
        end: Point,
    ) -> RasterResult<()> {
        self.gradient(
            destination,
            paint,
            Geometry {
                kind: GradientKind::Linear,
                start,
                start_radius: 0.0,
                end,
                end_radius: 0.0,
            },
        )
    }

    /// Paint every pixel of `destination` with a two-circle radial gradient.
    #[tracing::instrument(level = "debug", skip(self, destination, paint))]
    pub fn radial_gradient(
        &mut self,
        destination: &B::Buffer,
        paint: &GradientPaint,
        start: Point,
        start_radius: f64,
        end: Point,
        end_radius: f64,
    ) -> RasterResult<()> {
        self.gradient(
            destination,
            paint,
            Geometry {
                kind: GradientKind::Radial,
                start,
                start_radius,
                end,
                end_radius,
            },
        )
    }

    fn gradient(
        &mut self,
        destination: &B::Buffer,
        paint: &GradientPaint,
        g: Geometry,
    ) -> RasterResult<()> {
        self.batcher.ensure_open()?;
        let n = self.components() as usize;
        self.check_layer("destination", destination, self.components())?;
        for stop in &paint.stops {
            if !stop.offset.is_finite() {
                return Err(RasterError::validation(format!(
                    "gradient stop offset must be finite, got {}",
                    stop.offset
                )));
            }
            if stop.color.count() != n {
                return Err(RasterError::validation(format!(
                    "gradient stop has {} channels, renderer expects {n}",
                    stop.color.count()
                )));
            }
        }
        if !(g.start_radius.is_finite() && g.end_radius.is_finite())
            || g.start_radius < 0.0
            || g.end_radius < 0.0
        {
            return Err(RasterError::validation(
                "gradient radii must be finite and >= 0",
            ));
        }

        let det = paint.transform.determinant();
        let degenerate = match g.kind {
            GradientKind::Linear => almost_equal(g.start, g.end),
            GradientKind::Radial => {
                almost_equal(g.start, g.end) && almost_zero(g.start_radius - g.end_radius)
            }
        };
        if paint.stops.is_empty() || !det.is_finite() || almost_zero(det) || degenerate {
            tracing::trace!(kind = g.kind.label(), "skipped degenerate gradient");
            return Ok(());
        }

        let mut stops = paint.stops.clone();
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        let mut words = Vec::with_capacity(stops.len() * STOP_WORDS);
        for stop in &stops {
            words.push(stop.offset as f32);
            words.extend_from_slice(&stop.color.padded());
        }
        let stop_buffer = self.resources.upload(&words)?;

        let key = PipelineKey::Gradient {
            kind: g.kind,
            start_spread: paint.start_spread,
            end_spread: paint.end_spread,
        };
        let params = GradientParams {
            inverse: affine_words(paint.transform.inverse()),
            start: [g.start.x as f32, g.start.y as f32],
            end: [g.end.x as f32, g.end.y as f32],
            start_radius: g.start_radius as f32,
            end_radius: g.end_radius as f32,
            stop_count: stops.len() as u32,
            width: self.width,
        };
        self.dispatch(
            key,
            &params,
            &[destination, &stop_buffer],
            [self.width, self.height],
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/gradient.rs"]
mod tests;
