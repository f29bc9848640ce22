use crate::device::Backend;
use crate::foundation::core::Affine;
use crate::foundation::error::{RasterError, RasterResult};
use crate::foundation::math::almost_zero;
use crate::kernels::params::{ResampleParams, affine_words};
use crate::pipeline::key::{PipelineKey, ResamplingAlgorithm, WrapMode};
use crate::render::encoder::Encoder;

/// Largest Lanczos window [`Encoder::draw_texture`] accepts.
pub const MAX_LANCZOS_LOBES: u32 = 32;

/// Source image for [`Encoder::draw_texture`].
///
/// Pixels are tightly packed rows of non-premultiplied floats in the renderer's layout,
/// alpha last.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    components: u32,
    pixels: Vec<f32>,
    pub algorithm: ResamplingAlgorithm,
    /// Addressing outside `[0, width)`.
    pub h_wrap: WrapMode,
    /// Addressing outside `[0, height)`.
    pub v_wrap: WrapMode,
}

impl Texture {
    /// Texture of `width x height` pixels with `components` channels each, sampled
    /// bilinearly with clamped edges.
    pub fn new(width: u32, height: u32, components: u32, pixels: Vec<f32>) -> RasterResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::validation(format!(
                "texture size must be non-zero, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * components as usize;
        if components < 2 || pixels.len() != expected {
            return Err(RasterError::validation(format!(
                "texture {width}x{height}x{components} needs {expected} floats, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            components,
            pixels,
            algorithm: ResamplingAlgorithm::default(),
            h_wrap: WrapMode::Clamp,
            v_wrap: WrapMode::Clamp,
        })
    }

    /// Replace the resampling kernel.
    pub fn with_algorithm(mut self, algorithm: ResamplingAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_wrap(mut self, h_wrap: WrapMode, v_wrap: WrapMode) -> Self {
        self.h_wrap = h_wrap;
        self.v_wrap = v_wrap;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn components(&self) -> u32 {
        self.components
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }
}

fn kernel_scalars(algorithm: ResamplingAlgorithm) -> (f32, f32, u32) {
    match algorithm {
        ResamplingAlgorithm::Hermite { tension, bias } => (tension as f32, bias as f32, 0),
        ResamplingAlgorithm::Mitchell { b, c } => (b as f32, c as f32, 0),
        ResamplingAlgorithm::Lanczos { a } => (0.0, 0.0, a),
        _ => (0.0, 0.0, 0),
    }
}

impl<B: Backend> Encoder<B> {
    /// Overwrite every pixel of `destination` with `texture` mapped through `transform`.
    ///
    /// Each pixel averages `antialias x antialias` subsamples, each pulled back into texture
    /// space through the inverse transform. A non-invertible transform is a no-op.
    #[tracing::instrument(level = "debug", skip(self, texture, destination), fields(kernel = texture.algorithm.kernel().label()))]
    pub fn draw_texture(
        &mut self,
        texture: &Texture,
        destination: &B::Buffer,
        transform: Affine,
        antialias: u32,
    ) -> RasterResult<()> {
        self.batcher.ensure_open()?;
        if antialias == 0 {
            return Err(RasterError::validation("antialias factor must be >= 1"));
        }
        let samples = antialias.checked_mul(antialias);
        let grid = self
            .width
            .checked_mul(antialias)
            .zip(self.height.checked_mul(antialias));
        if samples.is_none() || grid.is_none() {
            return Err(RasterError::validation(format!(
                "antialias factor {antialias} overflows the sample grid"
            )));
        }
        if let ResamplingAlgorithm::Lanczos { a } = texture.algorithm
            && a > MAX_LANCZOS_LOBES
        {
            return Err(RasterError::validation(format!(
                "lanczos window {a} exceeds {MAX_LANCZOS_LOBES}"
            )));
        }
        if texture.components != self.components() {
            return Err(RasterError::validation(format!(
                "texture has {} channels, renderer expects {}",
                texture.components,
                self.components()
            )));
        }
        self.check_layer("destination", destination, self.components())?;

        let det = transform.determinant();
        if !det.is_finite() || almost_zero(det) {
            tracing::trace!("skipped texture draw with a singular transform");
            return Ok(());
        }

        let source = self.resources.upload(&texture.pixels)?;
        let key = PipelineKey::Resample {
            kernel: texture.algorithm.kernel(),
            h_wrap: texture.h_wrap,
            v_wrap: texture.v_wrap,
        };
        let (a, b, lobes) = kernel_scalars(texture.algorithm);
        let params = ResampleParams {
            inverse: affine_words(transform.inverse()),
            src_width: texture.width,
            src_height: texture.height,
            width: self.width,
            antialias,
            a,
            b,
            lobes,
            reserved: 0,
        };
        self.dispatch(
            key,
            &params,
            &[&source, destination],
            [self.width, self.height],
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/resample.rs"]
mod tests;
