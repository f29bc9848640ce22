use std::sync::Arc;

use bytemuck::Pod;

use crate::device::{Backend, CommandBuffer};
use crate::foundation::error::{RasterError, RasterResult};
use crate::pipeline::key::PipelineKey;
use crate::render::batcher::{BatchStats, CommandBatcher};
use crate::render::renderer::Renderer;
use crate::render::resources::{ResourceManager, StencilPool, StencilPoolStats};

/// Components of a clip layer: gray then alpha.
pub const CLIP_COMPONENTS: u32 = 2;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EncoderStats {
    pub batch: BatchStats,
    pub stencil: StencilPoolStats,
}

/// A `width x height` recording session on one renderer.
///
/// Operations record device work and return immediately. Work reaches the device when the
/// dispatch limit forces a flush, on [`Encoder::commit`], or when the encoder is dropped.
/// After a commit every operation fails with [`RasterError::SessionCommitted`].
pub struct Encoder<B: Backend> {
    pub(crate) renderer: Arc<Renderer<B>>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) resources: ResourceManager<B>,
    pub(crate) stencil: StencilPool<B>,
    pub(crate) batcher: CommandBatcher<B>,
}

impl<B: Backend> Encoder<B> {
    pub(crate) fn new(renderer: Arc<Renderer<B>>, width: u32, height: u32) -> RasterResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::validation(format!(
                "encoder size must be non-zero, got {width}x{height}"
            )));
        }
        let backend = Arc::clone(renderer.backend());
        let opts = renderer.opts();
        let resources = ResourceManager::new(Arc::clone(&backend), opts.max_buffer_bytes);
        let batcher = CommandBatcher::new(backend, opts.dispatch_limit)?;
        Ok(Self {
            renderer,
            width,
            height,
            resources,
            stencil: StencilPool::new(),
            batcher,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels per pixel of this session's layers.
    pub fn components(&self) -> u32 {
        self.renderer.components()
    }

    /// Renderer this session records for.
    pub fn renderer(&self) -> &Arc<Renderer<B>> {
        &self.renderer
    }

    pub fn stats(&self) -> EncoderStats {
        EncoderStats {
            batch: self.batcher.stats(),
            stencil: self.stencil.stats(),
        }
    }

    pub(crate) fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn layer_bytes(&self, components: u32) -> RasterResult<usize> {
        self.pixel_count()
            .checked_mul(components as usize * 4)
            .ok_or_else(|| RasterError::allocation("layer size overflows usize"))
    }

    /// Fail unless `buffer` can hold a full layer of `components` channels.
    pub(crate) fn check_layer(
        &self,
        what: &str,
        buffer: &B::Buffer,
        components: u32,
    ) -> RasterResult<()> {
        let need = self.layer_bytes(components)?;
        let have = self.renderer.backend().buffer_len(buffer);
        if have < need {
            return Err(RasterError::validation(format!(
                "{what} buffer holds {have} bytes, a {}x{} layer of {components} channels needs {need}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    pub(crate) fn check_clip(&self, clip: Option<&B::Buffer>) -> RasterResult<()> {
        match clip {
            Some(c) => self.check_layer("clip", c, CLIP_COMPONENTS),
            None => Ok(()),
        }
    }

    /// Record one dispatch of the program for `key`.
    pub(crate) fn dispatch<P: Pod>(
        &mut self,
        key: PipelineKey,
        params: &P,
        bindings: &[&B::Buffer],
        grid: [u32; 2],
    ) -> RasterResult<()> {
        let program = self.renderer.program(key)?;
        self.dispatch_program(&program, params, bindings, grid)
    }

    pub(crate) fn dispatch_program<P: Pod>(
        &mut self,
        program: &B::Program,
        params: &P,
        bindings: &[&B::Buffer],
        grid: [u32; 2],
    ) -> RasterResult<()> {
        if grid[0] == 0 || grid[1] == 0 {
            return Ok(());
        }
        self.batcher
            .compute()?
            .dispatch(program, bytemuck::bytes_of(params), bindings, grid)
    }

    /// Zero-initialized layer sized for this session.
    pub fn alloc_texture(&mut self) -> RasterResult<B::Buffer> {
        self.batcher.ensure_open()?;
        let bytes = self.layer_bytes(self.components())?;
        self.resources.alloc(bytes)
    }

    /// Layer initialized from `pixels`, `width * height * components` floats.
    pub fn make_buffer(&mut self, pixels: &[f32]) -> RasterResult<B::Buffer> {
        self.batcher.ensure_open()?;
        let expected = self.pixel_count() * self.components() as usize;
        if pixels.len() != expected {
            return Err(RasterError::validation(format!(
                "expected {expected} floats for a {}x{} layer, got {}",
                self.width,
                self.height,
                pixels.len()
            )));
        }
        self.resources.upload(pixels)
    }

    /// Zero every pixel of `buffer`.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn clear(&mut self, buffer: &B::Buffer) -> RasterResult<()> {
        self.batcher.ensure_open()?;
        self.batcher.blit()?.fill_zero(buffer)
    }

    /// Copy `source` into `destination`.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn copy(&mut self, source: &B::Buffer, destination: &B::Buffer) -> RasterResult<()> {
        self.batcher.ensure_open()?;
        if self.renderer.backend().same_buffer(source, destination) {
            return Ok(());
        }
        self.batcher.blit()?.copy_buffer(source, destination)
    }

    /// Submit all recorded work. With `wait_until_completed` the call returns once the device
    /// has finished it.
    pub fn commit(&mut self, wait_until_completed: bool) -> RasterResult<()> {
        self.batcher.commit(wait_until_completed)
    }

    /// A session of the same size for rendering gray clip layers, recorded on the gray
    /// renderer of this renderer's registry.
    pub fn clip_encoder(&self) -> RasterResult<Encoder<B>> {
        self.batcher.ensure_open()?;
        let gray = self.renderer.gray()?;
        Encoder::new(gray, self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/encoder.rs"]
mod tests;
