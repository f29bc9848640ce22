use crate::device::{Backend, CommandBuffer};
use crate::foundation::core::{ColorValue, Vec2};
use crate::foundation::error::{RasterError, RasterResult};
use crate::kernels::params::{LayerParams, ShadowParams};
use crate::pipeline::key::{BlendMode, CompositingMode, PipelineKey};
use crate::render::encoder::Encoder;

impl<B: Backend> Encoder<B> {
    fn layer_params(&self, opacity: f32) -> LayerParams {
        LayerParams {
            width: self.width,
            height: self.height,
            opacity,
            reserved: 0,
        }
    }

    // A raw copy moves the whole source buffer, which may be longer than the layer.
    fn blit_copy_fits(&self, source: &B::Buffer, destination: &B::Buffer) -> bool {
        let backend = self.renderer.backend();
        backend.buffer_len(source) <= backend.buffer_len(destination)
    }

    fn check_color(&self, color: &ColorValue) -> RasterResult<()> {
        if color.count() != self.components() as usize {
            return Err(RasterError::validation(format!(
                "color has {} channels, renderer expects {}",
                color.count(),
                self.components()
            )));
        }
        Ok(())
    }

    /// Composite `source` onto `destination`.
    ///
    /// With a `clip` layer the source alpha is scaled by the clip coverage first. Identical
    /// buffers are a no-op; unclipped `clear` and `(copy, normal)` run as blits.
    #[tracing::instrument(level = "debug", skip(self, source, destination, clip))]
    pub fn blend(
        &mut self,
        source: &B::Buffer,
        destination: &B::Buffer,
        clip: Option<&B::Buffer>,
        compositing: CompositingMode,
        blend: BlendMode,
    ) -> RasterResult<()> {
        self.batcher.ensure_open()?;
        let n = self.components();
        self.check_layer("source", source, n)?;
        self.check_layer("destination", destination, n)?;
        self.check_clip(clip)?;

        if self.renderer.backend().same_buffer(source, destination) {
            return Ok(());
        }
        if clip.is_none() {
            match (compositing, blend) {
                (CompositingMode::Clear, _) => {
                    return self.batcher.blit()?.fill_zero(destination);
                }
                (CompositingMode::Copy, BlendMode::Normal)
                    if self.blit_copy_fits(source, destination) =>
                {
                    return self.batcher.blit()?.copy_buffer(source, destination);
                }
                _ => {}
            }
        }

        let key = PipelineKey::Blend {
            compositing,
            blend,
            clipped: clip.is_some(),
        };
        let params = self.layer_params(1.0);
        let mut bindings = vec![source, destination];
        bindings.extend(clip);
        self.dispatch(key, &params, &bindings, [self.width, self.height])
    }

    /// Scale every alpha of `destination` by `opacity`.
    pub fn set_opacity(&mut self, destination: &B::Buffer, opacity: f32) -> RasterResult<()> {
        self.batcher.ensure_open()?;
        if !opacity.is_finite() {
            return Err(RasterError::validation(format!(
                "opacity must be finite, got {opacity}"
            )));
        }
        self.check_layer("destination", destination, self.components())?;
        if opacity == 1.0 {
            return Ok(());
        }
        let params = self.layer_params(opacity);
        self.dispatch(
            PipelineKey::SetOpacity,
            &params,
            &[destination],
            [self.width, self.height],
        )
    }

    /// Scale every alpha of `destination` by the coverage of the gray `clip` layer.
    pub fn clip(&mut self, destination: &B::Buffer, clip: &B::Buffer) -> RasterResult<()> {
        self.batcher.ensure_open()?;
        self.check_layer("destination", destination, self.components())?;
        self.check_clip(Some(clip))?;
        let params = self.layer_params(1.0);
        self.dispatch(
            PipelineKey::Clip,
            &params,
            &[destination, clip],
            [self.width, self.height],
        )
    }

    /// Render the drop shadow of `source` into `destination`.
    ///
    /// Every destination pixel is written: `color` with alpha scaled by the Gaussian-blurred
    /// source alpha sampled at `(x, y) - offset`. `blur` is twice the Gaussian's sigma.
    #[tracing::instrument(level = "debug", skip(self, source, destination))]
    pub fn shadow(
        &mut self,
        source: &B::Buffer,
        destination: &B::Buffer,
        color: ColorValue,
        offset: Vec2,
        blur: f64,
    ) -> RasterResult<()> {
        self.batcher.ensure_open()?;
        self.check_color(&color)?;
        if !blur.is_finite() || blur < 0.0 {
            return Err(RasterError::validation(format!(
                "shadow blur must be finite and >= 0, got {blur}"
            )));
        }
        if !offset.is_finite() {
            return Err(RasterError::validation("shadow offset must be finite"));
        }
        let n = self.components();
        self.check_layer("source", source, n)?;
        self.check_layer("destination", destination, n)?;
        if self.renderer.backend().same_buffer(source, destination) {
            return Err(RasterError::validation(
                "shadow source and destination must be distinct buffers",
            ));
        }

        let sigma = blur / 2.0;
        let radius = (6.0 * sigma).ceil() as u32 / 2;
        let params = ShadowParams {
            color: color.padded(),
            offset: [offset.x as f32, offset.y as f32],
            sigma: sigma as f32,
            radius,
            width: self.width,
            height: self.height,
        };
        self.dispatch(
            PipelineKey::Shadow,
            &params,
            &[source, destination],
            [self.width, self.height],
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
